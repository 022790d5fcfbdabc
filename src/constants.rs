/// Default column names every uploaded file must carry in its header row
pub const IDENTIFIER_COLUMN: &str = "identifier";
pub const CONTACT_ADDRESS_COLUMN: &str = "contact_address";
pub const ENROLLMENT_DATE_COLUMN: &str = "enrollment_date";

/// Suffix of the object keys that are validated; everything else is skipped
pub const DEFAULT_EXTENSION: &str = ".csv";

// Header is line 1, so the first data row is line 2
pub const HEADER_LINE: usize = 1;
pub const FIRST_DATA_LINE: usize = 2;
pub const FILE_LEVEL_LINE: usize = 0;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const ALERT_SUBJECT_PREFIX: &str = "CSV Validation Failed";

pub const ACK_STATUS_CODE: u16 = 200;
pub const ACK_BODY: &str = "Processing completed";

pub const DEFAULT_CONFIG_PATH: &str = "csv_gate.toml";
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_SERVER_PORT: u16 = 8080;
