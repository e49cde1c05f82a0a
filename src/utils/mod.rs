mod convert;
mod format;

pub use convert::ui_to_base_units;
pub use convert::base_units_to_ui;
pub use format::format_pubkey;
pub use format::format_pair;
