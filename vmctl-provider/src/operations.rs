//! The vmrun operation table.
//!
//! Each operation is a sub-command token plus an argument shape. A single
//! generic binder checks caller arguments against the shape, so no
//! per-operation code is needed to turn a request into a command line.

use crate::modes::{CloneMode, PowerMode, RunMode, ShareMode, VariableMode};
use std::fmt;
use std::str::FromStr;
use vmctl_core::error::{Result, VmctlError};

/// Whether a choice argument must be given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
    /// Inserted when the caller leaves it out.
    Default(&'static str),
}

/// One positional argument of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgSpec {
    /// Free text that must be present.
    Required(&'static str),
    /// Free text that may be left out.
    Optional(&'static str),
    /// One of a fixed set of tokens, passed through verbatim.
    Choice {
        name: &'static str,
        values: &'static [&'static str],
        presence: Presence,
    },
    /// A short key translated to a vmrun flag.
    Mapped {
        name: &'static str,
        pairs: &'static [(&'static str, &'static str)],
    },
    /// Everything that remains, possibly nothing.
    Rest(&'static str),
}

impl ArgSpec {
    fn is_required(&self) -> bool {
        matches!(
            self,
            ArgSpec::Required(_)
                | ArgSpec::Mapped { .. }
                | ArgSpec::Choice {
                    presence: Presence::Required,
                    ..
                }
        )
    }

    fn is_optional(&self) -> bool {
        matches!(
            self,
            ArgSpec::Optional(_)
                | ArgSpec::Choice {
                    presence: Presence::Optional | Presence::Default(_),
                    ..
                }
        )
    }
}

impl fmt::Display for ArgSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgSpec::Required(name) => write!(f, "<{name}>"),
            ArgSpec::Optional(name) => write!(f, "[{name}]"),
            ArgSpec::Choice {
                values, presence, ..
            } => match presence {
                Presence::Required => write!(f, "{}", values.join("|")),
                Presence::Optional => write!(f, "[{}]", values.join("|")),
                Presence::Default(d) => write!(f, "[{}] (default {d})", values.join("|")),
            },
            ArgSpec::Mapped { pairs, .. } => {
                let keys: Vec<&str> = pairs.iter().map(|(k, _)| *k).collect();
                write!(f, "{}", keys.join("|"))
            }
            ArgSpec::Rest(name) => write!(f, "[{name}...]"),
        }
    }
}

/// Families of operations, as grouped in `vmrun` help.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    Power,
    Snapshot,
    RecordReplay,
    Guest,
    Vprobe,
    General,
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Group::Power => "power",
            Group::Snapshot => "snapshot",
            Group::RecordReplay => "record/replay",
            Group::Guest => "guest",
            Group::Vprobe => "vprobe",
            Group::General => "general",
        })
    }
}

macro_rules! operations {
    (
        $(
            $(#[$doc:meta])*
            $variant:ident => $token:literal, $group:ident, [$($arg:expr),* $(,)?];
        )+
    ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Operation {
            $( $(#[$doc])* $variant, )+
        }

        impl Operation {
            pub const ALL: &'static [Operation] = &[$(Operation::$variant),+];

            /// Sub-command token passed to vmrun.
            pub fn token(&self) -> &'static str {
                match self {
                    $( Operation::$variant => $token, )+
                }
            }

            pub fn group(&self) -> Group {
                match self {
                    $( Operation::$variant => Group::$group, )+
                }
            }

            /// Positional arguments following the VM descriptor path.
            pub fn args(&self) -> &'static [ArgSpec] {
                match self {
                    $( Operation::$variant => {
                        const ARGS: &[ArgSpec] = &[$($arg),*];
                        ARGS
                    } )+
                }
            }
        }
    };
}

const POWER_MODE: ArgSpec = ArgSpec::Choice {
    name: "mode",
    values: PowerMode::VALUES,
    presence: Presence::Default("soft"),
};

const VARIABLE_MODE: ArgSpec = ArgSpec::Choice {
    name: "mode",
    values: VariableMode::VALUES,
    presence: Presence::Optional,
};

const RUNTIME: ArgSpec = ArgSpec::Choice {
    name: "runtime",
    values: &["runtime"],
    presence: Presence::Optional,
};

operations! {
    // Power
    Start => "start", Power, [ArgSpec::Choice { name: "display", values: &["gui", "nogui"], presence: Presence::Optional }];
    Stop => "stop", Power, [POWER_MODE];
    Reset => "reset", Power, [POWER_MODE];
    Suspend => "suspend", Power, [POWER_MODE];
    Pause => "pause", Power, [];
    Unpause => "unpause", Power, [];

    // Snapshots
    ListSnapshots => "listSnapshots", Snapshot, [ArgSpec::Choice { name: "tree", values: &["showTree"], presence: Presence::Optional }];
    Snapshot => "snapshot", Snapshot, [ArgSpec::Required("snapshot name")];
    DeleteSnapshot => "deleteSnapshot", Snapshot, [ArgSpec::Required("snapshot name")];
    RevertToSnapshot => "revertToSnapshot", Snapshot, [ArgSpec::Required("snapshot name")];

    // Record/replay
    BeginRecording => "beginRecording", RecordReplay, [ArgSpec::Required("snapshot name")];
    EndRecording => "endRecording", RecordReplay, [];
    BeginReplay => "beginReplay", RecordReplay, [ArgSpec::Required("snapshot name")];
    EndReplay => "endReplay", RecordReplay, [];

    // Guest OS
    RunProgramInGuest => "runProgramInGuest", Guest, [
        ArgSpec::Mapped { name: "mode", pairs: RunMode::FLAGS },
        ArgSpec::Required("program"),
        ArgSpec::Rest("program arguments"),
    ];
    /// Output is reduced to a boolean by the controller.
    FileExistsInGuest => "fileExistsInGuest", Guest, [ArgSpec::Required("path in guest")];
    /// Output is reduced to a boolean by the controller.
    DirectoryExistsInGuest => "directoryExistsInGuest", Guest, [ArgSpec::Required("path in guest")];
    SetSharedFolderState => "setSharedFolderState", Guest, [
        ArgSpec::Required("share name"),
        ArgSpec::Required("host path"),
        ArgSpec::Choice { name: "access", values: ShareMode::VALUES, presence: Presence::Default("readonly") },
    ];
    AddSharedFolder => "addSharedFolder", Guest, [ArgSpec::Required("share name"), ArgSpec::Required("host path")];
    RemoveSharedFolder => "removeSharedFolder", Guest, [ArgSpec::Required("share name")];
    EnableSharedFolders => "enableSharedFolders", Guest, [RUNTIME];
    DisableSharedFolders => "disableSharedFolders", Guest, [RUNTIME];
    ListProcessesInGuest => "listProcessesInGuest", Guest, [];
    KillProcessInGuest => "killProcessInGuest", Guest, [ArgSpec::Required("pid")];
    RunScriptInGuest => "runScriptInGuest", Guest, [ArgSpec::Required("interpreter path"), ArgSpec::Required("script text")];
    DeleteFileInGuest => "deleteFileInGuest", Guest, [ArgSpec::Required("path in guest")];
    CreateDirectoryInGuest => "createDirectoryInGuest", Guest, [ArgSpec::Required("directory in guest")];
    DeleteDirectoryInGuest => "deleteDirectoryInGuest", Guest, [ArgSpec::Required("directory in guest")];
    CreateTempfileInGuest => "createTempfileInGuest", Guest, [];
    ListDirectoryInGuest => "listDirectoryInGuest", Guest, [ArgSpec::Required("directory in guest")];
    CopyFileFromHostToGuest => "copyFileFromHostToGuest", Guest, [ArgSpec::Required("host path"), ArgSpec::Required("guest path")];
    CopyFileFromGuestToHost => "copyFileFromGuestToHost", Guest, [ArgSpec::Required("guest path"), ArgSpec::Required("host path")];
    RenameFileInGuest => "renameFileInGuest", Guest, [ArgSpec::Required("original name"), ArgSpec::Required("new name")];
    CaptureScreen => "captureScreen", Guest, [ArgSpec::Required("host path")];
    WriteVariable => "writeVariable", Guest, [VARIABLE_MODE, ArgSpec::Required("name"), ArgSpec::Required("value")];
    ReadVariable => "readVariable", Guest, [VARIABLE_MODE, ArgSpec::Required("name")];
    GetGuestIpAddress => "getGuestIPAddress", Guest, [ArgSpec::Choice { name: "wait", values: &["-wait"], presence: Presence::Optional }];

    // VProbes
    VprobeVersion => "vprobeVersion", Vprobe, [];
    VprobeLoad => "vprobeLoad", Vprobe, [ArgSpec::Required("script text")];
    VprobeLoadFile => "vprobeLoadFile", Vprobe, [ArgSpec::Required("path to vp file")];
    VprobeReset => "vprobeReset", Vprobe, [];
    VprobeListProbes => "vprobeListProbes", Vprobe, [];
    VprobeListGlobals => "vprobeListGlobals", Vprobe, [];

    // General
    /// Lists running VMs; the descriptor path is still sent.
    List => "list", General, [];
    UpgradeVm => "upgradevm", General, [];
    InstallTools => "installTools", General, [];
    CheckToolsState => "checkToolsState", General, [];
    Register => "register", General, [];
    Unregister => "unregister", General, [];
    ListRegisteredVm => "listRegisteredVM", General, [];
    DeleteVm => "deleteVM", General, [];
    Clone => "clone", General, [
        ArgSpec::Required("destination vmx"),
        ArgSpec::Choice { name: "clone mode", values: CloneMode::VALUES, presence: Presence::Required },
        ArgSpec::Optional("snapshot name"),
    ];
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

impl Operation {
    /// Look up by vmrun token (`revertToSnapshot`) or kebab-case name
    /// (`revert-to-snapshot`), ignoring case.
    pub fn from_name(name: &str) -> Option<Operation> {
        let wanted = normalize(name);
        Operation::ALL
            .iter()
            .copied()
            .find(|op| normalize(op.token()) == wanted)
    }

    /// Whether the controller turns this operation's output into a boolean.
    pub fn is_existence_check(&self) -> bool {
        matches!(
            self,
            Operation::FileExistsInGuest | Operation::DirectoryExistsInGuest
        )
    }

    /// One-line synopsis, e.g. `stop [hard|soft] (default soft)`.
    pub fn usage(&self) -> String {
        let mut parts = vec![self.token().to_string()];
        parts.extend(self.args().iter().map(ToString::to_string));
        parts.join(" ")
    }

    /// Check `args` against the operation's shape and produce the argument
    /// list that follows the VM descriptor path.
    ///
    /// Optional slots are filled left to right with whatever the caller
    /// supplied beyond the required arguments.
    pub fn bind<S: AsRef<str>>(&self, args: &[S]) -> Result<Vec<String>> {
        let specs = self.args();
        let required = specs.iter().filter(|s| s.is_required()).count();
        let optional = specs.iter().filter(|s| s.is_optional()).count();
        let has_rest = specs.iter().any(|s| matches!(s, ArgSpec::Rest(_)));

        if args.len() < required || (!has_rest && args.len() > required + optional) {
            return Err(VmctlError::InvalidArgument(format!(
                "{} takes {}; got {} argument(s). Usage: {}",
                self.token(),
                arity_text(required, optional, has_rest),
                args.len(),
                self.usage()
            )));
        }

        let mut optional_budget = (args.len() - required).min(optional);
        let mut supplied = args.iter().map(|arg| arg.as_ref());
        let mut bound = Vec::with_capacity(args.len() + 1);

        for spec in specs {
            match *spec {
                ArgSpec::Required(_) => bound.extend(supplied.next().map(str::to_string)),
                ArgSpec::Optional(_) => {
                    if optional_budget > 0 {
                        optional_budget -= 1;
                        bound.extend(supplied.next().map(str::to_string));
                    }
                }
                ArgSpec::Choice {
                    name,
                    values,
                    presence,
                } => {
                    let take = match presence {
                        Presence::Required => true,
                        Presence::Optional | Presence::Default(_) => optional_budget > 0,
                    };
                    if take {
                        if presence != Presence::Required {
                            optional_budget -= 1;
                        }
                        if let Some(value) = supplied.next() {
                            bound.push(self.check_choice(name, values, value)?);
                        }
                    } else if let Presence::Default(default) = presence {
                        bound.push(default.to_string());
                    }
                }
                ArgSpec::Mapped { name, pairs } => {
                    if let Some(key) = supplied.next() {
                        let flag = pairs
                            .iter()
                            .find(|(k, _)| *k == key)
                            .map(|(_, flag)| flag.to_string())
                            .ok_or_else(|| {
                                let keys: Vec<&str> = pairs.iter().map(|(k, _)| *k).collect();
                                VmctlError::InvalidArgument(format!(
                                    "invalid {} '{}' for {} (expected {})",
                                    name,
                                    key,
                                    self.token(),
                                    keys.join("|")
                                ))
                            })?;
                        bound.push(flag);
                    }
                }
                ArgSpec::Rest(_) => bound.extend(supplied.by_ref().map(str::to_string)),
            }
        }

        Ok(bound)
    }

    fn check_choice(&self, name: &str, values: &[&str], value: &str) -> Result<String> {
        if values.contains(&value) {
            Ok(value.to_string())
        } else {
            Err(VmctlError::InvalidArgument(format!(
                "invalid {} '{}' for {} (expected {})",
                name,
                value,
                self.token(),
                values.join("|")
            )))
        }
    }
}

fn arity_text(required: usize, optional: usize, has_rest: bool) -> String {
    if has_rest {
        format!("at least {required} argument(s)")
    } else if optional == 0 {
        format!("exactly {required} argument(s)")
    } else {
        format!("{} to {} argument(s)", required, required + optional)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Operation {
    type Err = VmctlError;

    fn from_str(s: &str) -> Result<Self> {
        Operation::from_name(s)
            .ok_or_else(|| VmctlError::InvalidArgument(format!("unknown operation '{s}'")))
    }
}
