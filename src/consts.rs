pub mod cli_consts {
    //! Client Configuration Constants
    //!
    //! Tunables for the dashboard, the tables and the API client, grouped by area.

    // =============================================================================
    // QUEUE CONFIGURATION
    // =============================================================================

    /// The maximum number of entries kept in the activity log.
    pub const MAX_ACTIVITY_LOGS: usize = 100;

    /// Buffer size of the channel carrying view updates to the dashboard.
    pub const EVENT_QUEUE_SIZE: usize = 100;

    // =============================================================================
    // DASHBOARD CONFIGURATION
    // =============================================================================

    /// Events whose name contains this text form the featured revenue bucket.
    pub const FEATURED_MARKER: &str = "entertainment eve";

    /// Rows per table page unless the config file says otherwise.
    pub const DEFAULT_PAGE_SIZE: usize = 10;

    /// Dashboard refresh cadence (seconds)
    pub const REFRESH_INTERVAL_SECS: u64 = 60;

    // =============================================================================
    // NETWORK CONFIGURATION
    // =============================================================================

    /// HTTP client timeouts
    pub mod network {
        use std::time::Duration;

        /// Time allowed to establish a connection (milliseconds)
        pub const CONNECT_TIMEOUT_MS: u64 = 10_000;

        /// Time allowed for a whole request including the body (milliseconds)
        pub const REQUEST_TIMEOUT_MS: u64 = 10_000;

        pub const fn connect_timeout() -> Duration {
            Duration::from_millis(CONNECT_TIMEOUT_MS)
        }

        pub const fn request_timeout() -> Duration {
            Duration::from_millis(REQUEST_TIMEOUT_MS)
        }
    }
}
