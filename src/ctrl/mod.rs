//! Query and admin commands over the CDC state, and how their results are printed.
mod command;
mod controller;
mod presenter;

pub use command::CtrlCommand;
pub use command::UnknownCommand;
pub use controller::CaptureEntry;
pub use controller::Controller;
pub use controller::CtrlError;
pub use controller::CtrlInput;
pub use controller::CtrlOutput;
pub use presenter::render;
