//! The vmrun controller.

use crate::modes::{CloneMode, PowerMode, RunMode, ShareMode, VariableMode};
use crate::operations::Operation;
use crate::runner::{CommandRunner, ProcessRunner};
use crate::target::InvocationTarget;
use std::sync::Arc;
use tracing::debug;
use vmctl_config::ControlConfig;
use vmctl_core::error::{Result, VmctlError};
use vmctl_core::{vmctl_debug, CommandLine};

/// Drives one VM through the vmrun command-line tool.
///
/// Every operation builds a fresh command line from the immutable
/// [`InvocationTarget`], so a controller can be shared across threads.
#[derive(Clone)]
pub struct Vmrun {
    target: InvocationTarget,
    runner: Arc<dyn CommandRunner>,
}

impl Vmrun {
    pub fn new(target: InvocationTarget) -> Self {
        Self::with_runner(target, Arc::new(ProcessRunner))
    }

    pub fn with_runner(target: InvocationTarget, runner: Arc<dyn CommandRunner>) -> Self {
        Self { target, runner }
    }

    pub fn from_config(config: &ControlConfig) -> Self {
        Self::new(InvocationTarget::from_config(config))
    }

    pub fn target(&self) -> &InvocationTarget {
        &self.target
    }

    /// The parameter string `op` would run with, without launching anything.
    pub fn command_line<S: AsRef<str>>(&self, op: Operation, args: &[S]) -> Result<CommandLine> {
        let bound = op.bind(args)?;
        Ok(CommandLine::build(
            self.target.product(),
            self.target.credentials(),
            op.token(),
            self.target.vmx(),
            &bound,
            self.target.quote_style(),
        ))
    }

    /// Run `op` and return vmrun's stdout lines.
    pub fn invoke<S: AsRef<str>>(&self, op: Operation, args: &[S]) -> Result<Vec<String>> {
        let line = self.command_line(op, args)?;
        let program = self.target.binary().command().ok_or_else(|| {
            VmctlError::Resolution(format!("needed for {}", op.token()))
        })?;

        if self.target.debug() {
            vmctl_debug!("{}", line);
        }
        debug!(operation = op.token(), params = line.redacted(), "invoking vmrun");

        let output = self
            .runner
            .run(self.target.launch(), program, &line, self.target.options())?;
        Ok(output.lines)
    }

    fn exists(&self, op: Operation, path: &str) -> Result<bool> {
        let lines = self.invoke(op, &[path])?;
        Ok(!lines.join("\n").contains("not"))
    }

    /// `false` when vmrun reports that the file does not exist.
    pub fn file_exists_in_guest(&self, path: &str) -> Result<bool> {
        self.exists(Operation::FileExistsInGuest, path)
    }

    pub fn directory_exists_in_guest(&self, path: &str) -> Result<bool> {
        self.exists(Operation::DirectoryExistsInGuest, path)
    }

    /// `None` leaves the window choice to vmrun.
    pub fn start(&self, gui: Option<bool>) -> Result<Vec<String>> {
        match gui {
            Some(true) => self.invoke(Operation::Start, &["gui"]),
            Some(false) => self.invoke(Operation::Start, &["nogui"]),
            None => self.invoke::<&str>(Operation::Start, &[]),
        }
    }

    pub fn stop(&self, mode: PowerMode) -> Result<Vec<String>> {
        self.invoke(Operation::Stop, &[mode.as_str()])
    }

    pub fn reset(&self, mode: PowerMode) -> Result<Vec<String>> {
        self.invoke(Operation::Reset, &[mode.as_str()])
    }

    pub fn suspend(&self, mode: PowerMode) -> Result<Vec<String>> {
        self.invoke(Operation::Suspend, &[mode.as_str()])
    }

    pub fn snapshot(&self, name: &str) -> Result<Vec<String>> {
        self.invoke(Operation::Snapshot, &[name])
    }

    pub fn revert_to_snapshot(&self, name: &str) -> Result<Vec<String>> {
        self.invoke(Operation::RevertToSnapshot, &[name])
    }

    pub fn run_program_in_guest<S: AsRef<str>>(
        &self,
        mode: RunMode,
        program: &str,
        program_args: &[S],
    ) -> Result<Vec<String>> {
        let mut args = vec![mode.as_str(), program];
        args.extend(program_args.iter().map(|a| a.as_ref()));
        self.invoke(Operation::RunProgramInGuest, &args)
    }

    pub fn copy_file_from_host_to_guest(&self, host: &str, guest: &str) -> Result<Vec<String>> {
        self.invoke(Operation::CopyFileFromHostToGuest, &[host, guest])
    }

    pub fn copy_file_from_guest_to_host(&self, guest: &str, host: &str) -> Result<Vec<String>> {
        self.invoke(Operation::CopyFileFromGuestToHost, &[guest, host])
    }

    pub fn set_shared_folder_state(
        &self,
        share: &str,
        host_path: &str,
        mode: ShareMode,
    ) -> Result<Vec<String>> {
        self.invoke(
            Operation::SetSharedFolderState,
            &[share, host_path, mode.as_str()],
        )
    }

    pub fn write_variable(
        &self,
        mode: Option<VariableMode>,
        name: &str,
        value: &str,
    ) -> Result<Vec<String>> {
        let mut args: Vec<&str> = mode.iter().map(VariableMode::as_str).collect();
        args.extend([name, value]);
        self.invoke(Operation::WriteVariable, &args)
    }

    pub fn read_variable(&self, mode: Option<VariableMode>, name: &str) -> Result<Vec<String>> {
        let mut args: Vec<&str> = mode.iter().map(VariableMode::as_str).collect();
        args.push(name);
        self.invoke(Operation::ReadVariable, &args)
    }

    pub fn get_guest_ip_address(&self, wait: bool) -> Result<Vec<String>> {
        let args: &[&str] = if wait { &["-wait"] } else { &[] };
        self.invoke(Operation::GetGuestIpAddress, args)
    }

    pub fn clone_vm(
        &self,
        destination: &str,
        mode: CloneMode,
        snapshot: Option<&str>,
    ) -> Result<Vec<String>> {
        let mut args = vec![destination, mode.as_str()];
        args.extend(snapshot);
        self.invoke(Operation::Clone, &args)
    }

    /// Running VMs as reported by vmrun, header line included.
    pub fn list(&self) -> Result<Vec<String>> {
        self.invoke::<&str>(Operation::List, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::RecordingRunner;
    use std::path::PathBuf;
    use vmctl_core::{Credentials, ExecOptions, LaunchStrategy, Product, QuoteStyle};
    use vmctl_platform::{ResolutionSource, ResolvedBinary};

    const VMX: &str = "/vms/build/build.vmx";
    const PREFIX: &str = "-T ws -gu admin -gp s3cret";

    fn target() -> InvocationTarget {
        InvocationTarget::new(VMX, Product::Ws, Credentials::new("admin", "s3cret"))
            .with_binary(ResolvedBinary::Resolved {
                path: PathBuf::from("/usr/bin/vmrun"),
                command: "/usr/bin/vmrun".into(),
                source: ResolutionSource::SearchPath,
            })
            .with_launch(LaunchStrategy::POSIX_SHELL, QuoteStyle::Posix)
    }

    fn controller(runner: &Arc<RecordingRunner>) -> Vmrun {
        Vmrun::with_runner(target(), runner.clone())
    }

    #[test]
    fn test_every_command_line_starts_with_fixed_prefix() {
        let runner = Arc::new(RecordingRunner::new());
        let vm = controller(&runner);

        vm.stop(PowerMode::Hard).unwrap();
        vm.snapshot("clean").unwrap();
        vm.list().unwrap();

        assert_eq!(
            runner.params(),
            vec![
                format!("{PREFIX} stop \"{VMX}\" hard"),
                format!("{PREFIX} snapshot \"{VMX}\" clean"),
                format!("{PREFIX} list \"{VMX}\""),
            ]
        );
    }

    #[test]
    fn test_program_and_options_are_forwarded() {
        let runner = Arc::new(RecordingRunner::new());
        let target = target().with_options(ExecOptions {
            timeout_secs: Some(30),
            strict_exit_codes: true,
        });
        let vm = Vmrun::with_runner(target, runner.clone());

        vm.reset(PowerMode::Soft).unwrap();

        let call = &runner.calls()[0];
        assert_eq!(call.program, "/usr/bin/vmrun");
        assert_eq!(call.strategy, LaunchStrategy::POSIX_SHELL);
        assert_eq!(call.options.timeout_secs, Some(30));
        assert!(call.options.strict_exit_codes);
    }

    #[test]
    fn test_run_program_in_guest_maps_mode() {
        let runner = Arc::new(RecordingRunner::new());
        let vm = controller(&runner);

        vm.run_program_in_guest(RunMode::NoWait, "/bin/touch", &["/tmp/marker"])
            .unwrap();

        assert_eq!(
            runner.params()[0],
            format!("{PREFIX} runProgramInGuest \"{VMX}\" -noWait /bin/touch /tmp/marker")
        );
    }

    #[test]
    fn test_invalid_mode_never_reaches_runner() {
        let runner = Arc::new(RecordingRunner::new());
        let vm = controller(&runner);

        let err = vm
            .invoke(Operation::RunProgramInGuest, &["x", "/bin/ls"])
            .unwrap_err();
        assert!(matches!(err, VmctlError::InvalidArgument(_)));
        let err = vm.invoke(Operation::Suspend, &["later"]).unwrap_err();
        assert!(matches!(err, VmctlError::InvalidArgument(_)));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_file_exists_in_guest() {
        let runner = Arc::new(RecordingRunner::replying(["The file does not exist"]));
        let vm = controller(&runner);
        assert!(!vm.file_exists_in_guest("C:\\missing.txt").unwrap());

        runner.push_reply(["The file exists"]);
        assert!(vm.file_exists_in_guest("/etc/hosts").unwrap());

        assert_eq!(
            runner.params()[1],
            format!("{PREFIX} fileExistsInGuest \"{VMX}\" /etc/hosts")
        );
    }

    #[test]
    fn test_existence_check_looks_across_lines() {
        let runner = Arc::new(RecordingRunner::replying(["The directory", "does not exist"]));
        let vm = controller(&runner);
        assert!(!vm.directory_exists_in_guest("/opt/app").unwrap());

        runner.push_reply(Vec::<String>::new());
        assert!(vm.directory_exists_in_guest("/opt").unwrap());
    }

    #[test]
    fn test_write_and_read_variable() {
        let runner = Arc::new(RecordingRunner::new());
        let vm = controller(&runner);

        vm.write_variable(Some(VariableMode::GuestEnv), "BUILD_ID", "42")
            .unwrap();
        vm.write_variable(None, "BUILD_ID", "43").unwrap();
        vm.read_variable(Some(VariableMode::RuntimeConfig), "displayName")
            .unwrap();

        assert_eq!(
            runner.params(),
            vec![
                format!("{PREFIX} writeVariable \"{VMX}\" guestEnv BUILD_ID 42"),
                format!("{PREFIX} writeVariable \"{VMX}\" BUILD_ID 43"),
                format!("{PREFIX} readVariable \"{VMX}\" runtimeConfig displayName"),
            ]
        );
    }

    #[test]
    fn test_clone_with_and_without_snapshot() {
        let runner = Arc::new(RecordingRunner::new());
        let vm = controller(&runner);

        vm.clone_vm("/vms/copy.vmx", CloneMode::Linked, Some("base"))
            .unwrap();
        vm.clone_vm("/vms/full.vmx", CloneMode::Full, None).unwrap();

        assert_eq!(
            runner.params(),
            vec![
                format!("{PREFIX} clone \"{VMX}\" /vms/copy.vmx linked base"),
                format!("{PREFIX} clone \"{VMX}\" /vms/full.vmx full"),
            ]
        );
    }

    #[test]
    fn test_arguments_with_spaces_are_quoted() {
        let runner = Arc::new(RecordingRunner::new());
        let vm = controller(&runner);

        vm.copy_file_from_host_to_guest("/home/me/my file.txt", "/tmp/it's.txt")
            .unwrap();

        assert_eq!(
            runner.params()[0],
            format!(
                "{PREFIX} copyFileFromHostToGuest \"{VMX}\" '/home/me/my file.txt' '/tmp/it'\"'\"'s.txt'"
            )
        );
    }

    #[test]
    fn test_repeated_read_only_operation_is_identical() {
        let runner = Arc::new(RecordingRunner::new());
        let vm = controller(&runner);

        vm.list().unwrap();
        vm.list().unwrap();

        let params = runner.params();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0], params[1]);
    }

    #[test]
    fn test_unresolved_binary_fails_at_invocation() {
        let runner = Arc::new(RecordingRunner::new());
        let target = InvocationTarget::new(VMX, Product::Fusion, Credentials::default());
        let vm = Vmrun::with_runner(target, runner.clone());

        let err = vm.list().unwrap_err();
        assert!(matches!(err, VmctlError::Resolution(_)));
        assert!(runner.calls().is_empty());

        // Building the command line does not need the binary.
        let line = vm.command_line::<&str>(Operation::List, &[]).unwrap();
        assert_eq!(line.as_str(), format!("-T fusion -gu  -gp  list \"{VMX}\""));
    }

    #[test]
    fn test_debug_flag_does_not_change_the_call() {
        let runner = Arc::new(RecordingRunner::new());
        let vm = Vmrun::with_runner(target().with_debug(true), runner.clone());

        vm.start(Some(false)).unwrap();

        assert_eq!(
            runner.params(),
            vec![format!("{PREFIX} start \"{VMX}\" nogui")]
        );
    }

    #[test]
    fn test_start_without_window_choice_passes_no_argument() {
        let runner = Arc::new(RecordingRunner::new());
        let vm = Vmrun::with_runner(target(), runner.clone());

        vm.start(None).unwrap();
        vm.start(Some(true)).unwrap();

        assert_eq!(
            runner.params(),
            vec![
                format!("{PREFIX} start \"{VMX}\""),
                format!("{PREFIX} start \"{VMX}\" gui"),
            ]
        );
    }

    #[test]
    fn test_output_lines_are_returned_unchanged() {
        let runner = Arc::new(RecordingRunner::replying([
            "Total running VMs: 1",
            "  /vms/build/build.vmx  ",
        ]));
        let vm = controller(&runner);

        assert_eq!(
            vm.list().unwrap(),
            vec!["Total running VMs: 1", "  /vms/build/build.vmx  "]
        );
    }
}
