use super::{Link, LinkAddress};
use crate::error::Error;

const REASON: &str = "link control is not supported on this platform";

pub(crate) fn link_by_name(name: &str) -> Result<Link, Error> {
    Err(Error::LinkResolution {
        name: name.to_owned(),
        reason: REASON.to_owned(),
    })
}

pub(crate) async fn addr_add(_link: &Link, address: &LinkAddress) -> Result<(), Error> {
    Err(Error::AddressBinding {
        address: address.address,
        reason: REASON.to_owned(),
    })
}

pub(crate) fn addr_del(_link: &Link, address: &LinkAddress) -> Result<(), Error> {
    Err(Error::AddressUnbinding {
        address: address.address,
        reason: REASON.to_owned(),
    })
}
