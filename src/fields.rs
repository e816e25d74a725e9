//! Element paths into the normalized CHB tree.
//!
//! Every field the pipeline reads is named here so schema drift is a one-line
//! change.

pub const EXPORT: &str = "export";
pub const STOPPLACES: &str = "stopplaces";
pub const STOPPLACE: &str = "stopplace";

pub const STOP_TOWN: &[&str] = &["stopplacename", "town"];
pub const STOP_QUAYS: &str = "quays";
pub const STOP_QUAY: &str = "quay";

pub const QUAY_CODE: &[&str] = &["quaycode"];
pub const QUAY_NAME: &[&str] = &["quaynamedata", "quayname"];
pub const QUAY_STATUS: &[&str] = &["quaystatusdata", "quaystatus"];
pub const QUAY_RD_X: &[&str] = &["quaylocationdata", "rd-x"];
pub const QUAY_RD_Y: &[&str] = &["quaylocationdata", "rd-y"];
pub const QUAY_BEARING: &[&str] = &["quaybearing", "compassdirection"];
pub const QUAY_TRANSPORT_MODES: &[&str] = &["quaytransportmodes", "transportmodedata"];
pub const TRANSPORT_MODE: &str = "transportmode";
pub const QUAY_VISUALLY_ACCESSIBLE: &[&str] = &["visuallyaccessible"];
pub const QUAY_DISABLED_ACCESSIBLE: &[&str] = &["disabledaccessible"];
pub const QUAY_ADAPTATIONS: &[&str] = &["quayaccessibilityadaptions"];

/// Status value that removes a quay from every output.
pub const STATUS_OUT_OF_USE: &str = "outOfUse";
