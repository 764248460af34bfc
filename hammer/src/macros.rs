//! Logging shortcuts used by the protocol worker.

/// Logs a classified reply.
macro_rules! log_receive(
    ($message_type:expr, $message:expr) => (
        trace!(
            "Received {} ({:#010x}) for {}",
            $message_type,
            $message.transaction_id,
            $message.your_ip_address,
        );
    );
);

/// Logs an outbound payload before it is handed to the socketeer.
macro_rules! log_send(
    ($message_type:expr, $transaction_id:expr, $destination:expr) => (
        trace!(
            "Sending {} ({:#010x}) to {}",
            $message_type,
            $transaction_id,
            $destination,
        );
    );
);
