pub mod ports;
pub mod alert_use_case;
pub mod dispatch_use_case;
