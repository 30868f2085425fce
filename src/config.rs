//! Exchange configuration.

/// Receive buffer size used for every datagram of an exchange.
///
/// Responses larger than this are reported as truncated; the buffer is
/// never grown to retry.
pub const DEFAULT_RECV_BUFFER_SIZE: usize = 4096;

/// Configuration for a request/response exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeConfig {
    /// Receive buffer capacity per datagram.
    pub recv_buffer_size: usize,
    /// Require `NLMSG_DONE` to carry its trailing status integer.
    pub strict_done_length: bool,
    /// How many times an interrupted send or receive is retried.
    /// `None` for unlimited.
    pub interrupt_retries: Option<u32>,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            recv_buffer_size: DEFAULT_RECV_BUFFER_SIZE,
            strict_done_length: true,
            interrupt_retries: None,
        }
    }
}

impl ExchangeConfig {
    /// The default configuration, with every protocol check enabled.
    pub fn strict() -> Self {
        Self::default()
    }

    /// Accept `NLMSG_DONE` messages without a status payload, as sent by
    /// older peers.
    pub fn lenient() -> Self {
        Self {
            strict_done_length: false,
            ..Self::default()
        }
    }

    /// Set the receive buffer capacity.
    pub fn with_recv_buffer_size(mut self, size: usize) -> Self {
        self.recv_buffer_size = size;
        self
    }

    /// Enable or disable the `NLMSG_DONE` length check.
    pub fn with_strict_done_length(mut self, strict: bool) -> Self {
        self.strict_done_length = strict;
        self
    }

    /// Limit the number of retries after an interrupted call.
    pub fn with_interrupt_retries(mut self, retries: Option<u32>) -> Self {
        self.interrupt_retries = retries;
        self
    }

    /// Check if another attempt should follow `attempt` interrupted calls.
    pub fn should_retry_interrupt(&self, attempt: u32) -> bool {
        match self.interrupt_retries {
            Some(max) => attempt < max,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExchangeConfig::default();
        assert_eq!(config.recv_buffer_size, 4096);
        assert!(config.strict_done_length);
        assert_eq!(config.interrupt_retries, None);
        assert_eq!(config, ExchangeConfig::strict());
    }

    #[test]
    fn test_lenient_config() {
        let config = ExchangeConfig::lenient();
        assert!(!config.strict_done_length);
        assert_eq!(config.recv_buffer_size, DEFAULT_RECV_BUFFER_SIZE);
    }

    #[test]
    fn test_builder_methods() {
        let config = ExchangeConfig::default()
            .with_recv_buffer_size(8192)
            .with_strict_done_length(false)
            .with_interrupt_retries(Some(3));

        assert_eq!(config.recv_buffer_size, 8192);
        assert!(!config.strict_done_length);
        assert!(config.should_retry_interrupt(2));
        assert!(!config.should_retry_interrupt(3));
    }

    #[test]
    fn test_unlimited_interrupt_retries() {
        let config = ExchangeConfig::default();
        assert!(config.should_retry_interrupt(0));
        assert!(config.should_retry_interrupt(u32::MAX - 1));
    }
}
