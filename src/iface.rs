//! Interface profile management via the initiator tool.
//!
//! Cloning a profile is a fixed sequence of tool invocations: show the
//! source profile, create the new profile, then apply each copied setting.
//! Later steps depend on the side effects of earlier ones, so the sequence
//! is never reordered or parallelized. Any failure once the profile exists
//! routes through a compensating delete so a half-configured profile is
//! never left behind.
//!
//! The tool keys its state by interface name; callers must serialize
//! operations for the same name. Concurrent clones of one source interface
//! are undefined.

use crate::{
    error::IscsiError,
    exec::Executor,
    record::parse_iscsiadm_show,
};
use tracing::{debug, warn};

/// Name of the initiator management binary.
pub const ISCSIADM: &str = "iscsiadm";
/// Record key naming the profile itself; never copied to a clone.
const IFACE_NAME_KEY: &str = "iface.iscsi_ifacename";
/// Record key holding the initiator name.
const INITIATOR_NAME_KEY: &str = "iface.initiatorname";

/// The `<portal>:<volume>` profile name used for a multipath login clone.
pub fn clone_iface_name(portal: &str, volume: &str) -> String {
    format!("{portal}:{volume}")
}

/// Client for the initiator management tool, generic over the command
/// executor so its invocation sequences are testable.
pub struct IscsiAdm<'a> {
    exec: &'a dyn Executor,
}

impl<'a> IscsiAdm<'a> {
    pub fn new(exec: &'a dyn Executor) -> Self {
        Self { exec }
    }

    /// Query an interface profile's settings, as raw record output.
    pub async fn show_iface(&self, iface: &str) -> Result<String, IscsiError> {
        let output = self
            .exec
            .execute(ISCSIADM, &["-m", "iface", "-I", iface, "-o", "show"])
            .await?;
        Ok(String::from_utf8_lossy(&output).to_string())
    }

    /// Create an empty interface profile.
    pub async fn new_iface(&self, iface: &str) -> Result<(), IscsiError> {
        self.exec
            .execute(ISCSIADM, &["-m", "iface", "-I", iface, "-o", "new"])
            .await?;
        Ok(())
    }

    /// Apply one setting to an interface profile.
    pub async fn update_iface(&self, iface: &str, key: &str, value: &str) -> Result<(), IscsiError> {
        self.exec
            .execute(
                ISCSIADM,
                &["-m", "iface", "-I", iface, "-o", "update", "-n", key, "-v", value],
            )
            .await?;
        Ok(())
    }

    /// Remove an interface profile.
    pub async fn delete_iface(&self, iface: &str) -> Result<(), IscsiError> {
        self.exec
            .execute(ISCSIADM, &["-m", "iface", "-I", iface, "-o", "delete"])
            .await?;
        Ok(())
    }

    /// Clone `source`'s settings into a new profile named `target`,
    /// overriding the initiator name when one is given.
    ///
    /// On success exactly one fully configured profile exists and its name
    /// is returned. Failure before the profile is created aborts with no
    /// side effects; failure afterwards deletes the profile again and
    /// surfaces the original error. A failed delete is reported in the log
    /// but never replaces the root cause.
    pub async fn clone_iface(
        &self,
        source: &str,
        target: &str,
        initiator_name: Option<&str>,
    ) -> Result<String, IscsiError> {
        let output = self.show_iface(source).await?;
        let mut settings = parse_iscsiadm_show(&output)?;
        settings.remove(IFACE_NAME_KEY);
        if let Some(initiator) = initiator_name {
            settings.insert(INITIATOR_NAME_KEY.to_string(), initiator.to_string());
        }

        self.new_iface(target).await?;

        // apply in sorted key order so failures surface deterministically
        let mut keys: Vec<&String> = settings.keys().collect();
        keys.sort();
        for key in keys {
            if let Err(error) = self.update_iface(target, key, &settings[key]).await {
                warn!(%error, iface = target, "update failed, deleting cloned interface");
                if let Err(delete_error) = self.delete_iface(target).await {
                    warn!(%delete_error, iface = target, "failed to delete cloned interface");
                }
                return Err(error);
            }
        }

        debug!(source, iface = target, "cloned interface");
        Ok(target.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExternalTool;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const SHOW_OUTPUT: &str =
        "iface.ipaddress = <empty>\niface.transport_name = tcp\niface.initiatorname = <empty>\n";

    type Handler = Box<dyn Fn(usize, &[&str]) -> Result<Vec<u8>, IscsiError> + Send + Sync>;

    /// Executor that records every invocation and answers via a handler
    /// keyed by call number.
    struct FakeExec {
        calls: Mutex<Vec<Vec<String>>>,
        handler: Handler,
    }

    impl FakeExec {
        fn new(handler: Handler) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                handler,
            }
        }

        fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Executor for FakeExec {
        async fn execute(&self, command: &str, args: &[&str]) -> Result<Vec<u8>, IscsiError> {
            assert_eq!(command, ISCSIADM);
            let mut calls = self.calls.lock().unwrap();
            calls.push(args.iter().map(ToString::to_string).collect());
            (self.handler)(calls.len(), args)
        }
    }

    fn tool_error(output: &str) -> IscsiError {
        ExternalTool {
            command: ISCSIADM,
            output,
        }
        .build()
    }

    fn verb(call: &[String]) -> &str {
        &call[5]
    }

    #[tokio::test]
    async fn clone_applies_settings() {
        let exec = FakeExec::new(Box::new(|call, _| match call {
            1 => Ok(SHOW_OUTPUT.into()),
            2 => Ok(b"New interface 192.168.1.10:pv0001 added".to_vec()),
            3 | 4 => Ok(Vec::new()),
            n => panic!("unexpected call nr {n}"),
        }));

        let name = IscsiAdm::new(&exec)
            .clone_iface("default", "192.168.1.10:pv0001", Some("iqn.1996-04.de.suse:01:a"))
            .await
            .unwrap();
        assert_eq!(name, "192.168.1.10:pv0001");

        // show, new, then one update per copied setting in key order
        let calls = exec.calls();
        assert_eq!(calls.len(), 4);
        assert_eq!(verb(&calls[0]), "show");
        assert_eq!(verb(&calls[1]), "new");
        assert_eq!(calls[2][5 ..], ["update", "-n", "iface.initiatorname", "-v", "iqn.1996-04.de.suse:01:a"]);
        assert_eq!(calls[3][5 ..], ["update", "-n", "iface.transport_name", "-v", "tcp"]);
    }

    #[tokio::test]
    async fn show_failure_has_no_side_effects() {
        let exec = FakeExec::new(Box::new(|_, _| Err(tool_error("test error"))));
        let error = IscsiAdm::new(&exec)
            .clone_iface("default", "192.168.1.10:pv0001", None)
            .await
            .unwrap_err();
        assert!(matches!(error, IscsiError::ExternalTool { .. }));
        assert_eq!(exec.calls().len(), 1);
    }

    #[tokio::test]
    async fn create_failure_has_no_cleanup() {
        let exec = FakeExec::new(Box::new(|call, _| match call {
            1 => Ok(SHOW_OUTPUT.into()),
            2 => Err(tool_error("test error")),
            n => panic!("unexpected call nr {n}"),
        }));
        IscsiAdm::new(&exec)
            .clone_iface("default", "192.168.1.10:pv0001", None)
            .await
            .unwrap_err();
        assert_eq!(exec.calls().len(), 2);
    }

    #[tokio::test]
    async fn update_failure_deletes_clone() {
        let exec = FakeExec::new(Box::new(|call, _| match call {
            1 => Ok(SHOW_OUTPUT.into()),
            2 | 3 => Ok(Vec::new()),
            4 => Err(tool_error("update error")),
            5 => Ok(Vec::new()),
            n => panic!("unexpected call nr {n}"),
        }));

        let error = IscsiAdm::new(&exec)
            .clone_iface("default", "192.168.1.10:pv0001", Some("iqn.1996-04.de.suse:01:a"))
            .await
            .unwrap_err();

        // the update error propagates, followed by exactly one delete
        assert!(error.to_string().contains("update error"));
        let calls = exec.calls();
        assert_eq!(calls.len(), 5);
        assert_eq!(verb(&calls[4]), "delete");
    }

    #[tokio::test]
    async fn failed_delete_keeps_original_error() {
        let exec = FakeExec::new(Box::new(|call, _| match call {
            1 => Ok(SHOW_OUTPUT.into()),
            2 => Ok(Vec::new()),
            3 => Err(tool_error("update error")),
            4 => Err(tool_error("delete error")),
            n => panic!("unexpected call nr {n}"),
        }));

        let error = IscsiAdm::new(&exec)
            .clone_iface("default", "192.168.1.10:pv0001", None)
            .await
            .unwrap_err();
        assert!(error.to_string().contains("update error"));
        assert_eq!(exec.calls().len(), 4);
    }

    #[test]
    fn derived_clone_name() {
        assert_eq!(clone_iface_name("192.168.1.10:3260", "pv0001"), "192.168.1.10:3260:pv0001");
    }
}
