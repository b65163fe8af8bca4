/// Provides some statistics about the use of a concrete connection.
///
/// A snapshot of the statistics can be obtained from
/// [`Connection::statistics`](crate::Connection::statistics).
/// It is possible to reset the statistics using
/// [`Connection::reset_statistics`](crate::Connection::reset_statistics).
#[derive(Debug, Clone)]
pub struct ConnectionStatistics {
    call_count: u32,
    read_count: u32,
    write_count: u32,
    fetched_rows: u64,
    affected_rows: u64,
    created_at: time::OffsetDateTime,
    last_reset_at: time::OffsetDateTime,
    wait_time: std::time::Duration,
}
impl Default for ConnectionStatistics {
    fn default() -> Self {
        let timestamp = time::OffsetDateTime::now_utc();
        Self {
            created_at: timestamp,
            last_reset_at: timestamp,
            call_count: 0,
            read_count: 0,
            write_count: 0,
            fetched_rows: 0,
            affected_rows: 0,
            wait_time: std::time::Duration::default(),
        }
    }
}
impl ConnectionStatistics {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reset(&mut self) {
        *self = Self {
            created_at: self.created_at,
            last_reset_at: time::OffsetDateTime::now_utc(),
            ..Default::default()
        };
    }

    pub(crate) fn add_call(&mut self, wait_time: std::time::Duration) {
        self.call_count += 1;
        self.wait_time += wait_time;
    }

    pub(crate) fn add_read(&mut self, fetched_rows: usize) {
        self.read_count += 1;
        self.fetched_rows += fetched_rows as u64;
    }

    pub(crate) fn add_write(&mut self, affected_rows: usize) {
        self.write_count += 1;
        self.affected_rows += affected_rows as u64;
    }

    /// Returns the number of calls to the database that were done through this connection
    /// since the last reset, including failed ones.
    pub fn call_count(&self) -> u32 {
        self.call_count
    }

    /// Returns the number of successful reads since the last reset.
    pub fn read_count(&self) -> u32 {
        self.read_count
    }

    /// Returns the number of successful writes since the last reset.
    pub fn write_count(&self) -> u32 {
        self.write_count
    }

    /// Returns the number of rows that were fetched since the last reset.
    pub fn fetched_rows(&self) -> u64 {
        self.fetched_rows
    }

    /// Returns the number of rows that writes reported as affected since the last reset.
    pub fn affected_rows(&self) -> u64 {
        self.affected_rows
    }

    /// Returns the total time spent waiting for the database since the last reset.
    pub fn accumulated_wait_time(&self) -> std::time::Duration {
        self.wait_time
    }

    /// Point in time when the connection was opened.
    pub fn created_at(&self) -> time::OffsetDateTime {
        self.created_at
    }

    /// Point in time of the last reset, or of the creation.
    pub fn last_reset_at(&self) -> time::OffsetDateTime {
        self.last_reset_at
    }
}

impl std::fmt::Display for ConnectionStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Connection statistics")?;
        writeln!(f, "Created at:     {}", self.created_at)?;
        writeln!(f, "Last reset at:  {}", self.last_reset_at)?;
        writeln!(f, "Total number of calls:    {}", self.call_count)?;
        writeln!(f, "Total wait time:          {:?}", self.wait_time)?;
        writeln!(f, "Reads",)?;
        writeln!(f, "  - count:                {}", self.read_count)?;
        writeln!(f, "  - fetched rows:         {}", self.fetched_rows)?;
        writeln!(f, "Writes",)?;
        writeln!(f, "  - count:                {}", self.write_count)?;
        writeln!(f, "  - affected rows:        {}", self.affected_rows)?;
        Ok(())
    }
}
