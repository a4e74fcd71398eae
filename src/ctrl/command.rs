use std::fmt;
use std::str::FromStr;

/// CtrlCommand is the fixed set of query and admin commands.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CtrlCommand {
    JobInfo,
    JobStatus,
    JobList,
    CaptureList,
    ProcessorList,
    SubCf,
    ClearAll,
    GetLogicalTime,
}

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
#[error("unknown command: {0}")]
pub struct UnknownCommand(pub String);

impl CtrlCommand {
    pub const ALL: [CtrlCommand; 8] = [
        CtrlCommand::JobInfo,
        CtrlCommand::JobStatus,
        CtrlCommand::JobList,
        CtrlCommand::CaptureList,
        CtrlCommand::ProcessorList,
        CtrlCommand::SubCf,
        CtrlCommand::ClearAll,
        CtrlCommand::GetLogicalTime,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            CtrlCommand::JobInfo => "job-info",
            CtrlCommand::JobStatus => "job-status",
            CtrlCommand::JobList => "job-list",
            CtrlCommand::CaptureList => "capture-list",
            CtrlCommand::ProcessorList => "processor-list",
            CtrlCommand::SubCf => "sub-cf",
            CtrlCommand::ClearAll => "clear-all",
            CtrlCommand::GetLogicalTime => "get-logical-time",
        }
    }

    // Older command names, still accepted.
    fn alias(&self) -> Option<&'static str> {
        match self {
            CtrlCommand::JobInfo => Some("query-cf-info"),
            CtrlCommand::JobStatus => Some("query-cf-status"),
            CtrlCommand::JobList => Some("query-cf-list"),
            CtrlCommand::CaptureList => Some("query-capture-list"),
            CtrlCommand::ProcessorList => Some("query-processor-list"),
            CtrlCommand::SubCf => Some("query-sub-cf"),
            CtrlCommand::ClearAll => None,
            CtrlCommand::GetLogicalTime => Some("get-tso"),
        }
    }
}

impl Default for CtrlCommand {
    fn default() -> Self {
        CtrlCommand::CaptureList
    }
}

impl FromStr for CtrlCommand {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CtrlCommand::ALL
            .iter()
            .copied()
            .find(|command| command.token() == s || command.alias() == Some(s))
            .ok_or_else(|| UnknownCommand(s.to_string()))
    }
}

impl fmt::Display for CtrlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
