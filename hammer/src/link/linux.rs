use std::{io, process};

use nix::net::if_::if_nametoindex;

use super::{Link, LinkAddress};
use crate::error::Error;

pub(crate) fn link_by_name(name: &str) -> Result<Link, Error> {
    let index = if_nametoindex(name).map_err(|errno| Error::LinkResolution {
        name: name.to_owned(),
        reason: errno.desc().to_owned(),
    })?;
    Ok(Link {
        name: name.to_owned(),
        index,
    })
}

pub(crate) async fn addr_add(link: &Link, address: &LinkAddress) -> Result<(), Error> {
    let output = tokio::process::Command::from(ip_addr("add", link, address))
        .output()
        .await;
    status(output).map_err(|reason| Error::AddressBinding {
        address: address.address,
        reason,
    })
}

pub(crate) fn addr_del(link: &Link, address: &LinkAddress) -> Result<(), Error> {
    status(ip_addr("del", link, address).output()).map_err(|reason| Error::AddressUnbinding {
        address: address.address,
        reason,
    })
}

fn ip_addr(action: &str, link: &Link, address: &LinkAddress) -> process::Command {
    let mut command = process::Command::new("ip");
    command
        .arg("addr")
        .arg(action)
        .arg(address.to_string())
        .arg("dev")
        .arg(&link.name);
    command
}

fn status(output: io::Result<process::Output>) -> Result<(), String> {
    let output = output.map_err(|error| error.to_string())?;
    if output.status.success() {
        Ok(())
    } else {
        Err(String::from_utf8_lossy(&output.stderr).trim().to_owned())
    }
}
