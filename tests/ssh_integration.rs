//! End-to-end tests against a real OpenSSH server in Docker.
//!
//! Run with `cargo test -- --ignored` on a machine with Docker available.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};

use linux_mcp_server::{
    ExecutionOutcome, ExecutionRequest, HostDirectory, HostKeyCheck, InvocationHandler,
    SessionOptions, SshExecutor, Stage,
};

const USER: &str = "alice";
const PASSWORD: &str = "p";

async fn start_sshd() -> ContainerAsync<GenericImage> {
    GenericImage::new("linuxserver/openssh-server", "latest")
        .with_exposed_port(2222.tcp())
        .with_wait_for(WaitFor::message_on_stdout("[ls.io-init] done."))
        .with_env_var("PUID", "1000")
        .with_env_var("PGID", "1000")
        .with_env_var("USER_NAME", USER)
        .with_env_var("USER_PASSWORD", PASSWORD)
        .with_env_var("PASSWORD_ACCESS", "true")
        .start()
        .await
        .expect("start openssh container")
}

async fn handler_for(
    container: &ContainerAsync<GenericImage>,
) -> (tempfile::NamedTempFile, InvocationHandler) {
    handler_with(
        container,
        SessionOptions::default().with_command_timeout(Some(Duration::from_secs(30))),
    )
    .await
}

async fn handler_with(
    container: &ContainerAsync<GenericImage>,
    options: SessionOptions,
) -> (tempfile::NamedTempFile, InvocationHandler) {
    let port = container
        .get_host_port_ipv4(2222)
        .await
        .expect("mapped ssh port");

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[{{"ip":"127.0.0.1","user":"{}","password":"{}","port":{}}}]"#,
        USER, PASSWORD, port
    )
    .unwrap();

    let executor = SshExecutor::new(options);
    let handler = InvocationHandler::new(HostDirectory::new(file.path()), Arc::new(executor));
    (file, handler)
}

fn request(working_dir: &str, command: &str) -> ExecutionRequest {
    ExecutionRequest {
        target: "127.0.0.1".to_string(),
        working_dir: working_dir.to_string(),
        command: command.to_string(),
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_echo_returns_output() {
    let container = start_sshd().await;
    let (_file, handler) = handler_for(&container).await;

    let outcome = handler.handle(&request("/tmp", "echo hi")).await;

    assert_eq!(
        outcome,
        ExecutionOutcome::Success {
            output: b"hi\n".to_vec()
        }
    );
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_working_directory_and_stderr_are_captured() {
    let container = start_sshd().await;
    let (_file, handler) = handler_for(&container).await;

    let outcome = handler.handle(&request("/tmp", "pwd; echo oops 1>&2")).await;

    assert_eq!(outcome.render(), "/tmp\noops\n");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_nonzero_exit_is_command_failure_with_empty_output() {
    let container = start_sshd().await;
    let (_file, handler) = handler_for(&container).await;

    let outcome = handler.handle(&request("/tmp", "exit 3")).await;

    assert_eq!(
        outcome,
        ExecutionOutcome::Failure {
            stage: Stage::CommandRun,
            message: "command execution failed: process exited with status 3".to_string(),
            partial_output: Some(Vec::new()),
        }
    );
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_wrong_password_is_session_failure() {
    let container = start_sshd().await;
    let port = container.get_host_port_ipv4(2222).await.unwrap();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[{{"ip":"127.0.0.1","user":"{}","password":"wrong","port":{}}}]"#,
        USER, port
    )
    .unwrap();
    let handler = InvocationHandler::new(
        HostDirectory::new(file.path()),
        Arc::new(SshExecutor::default()),
    );

    let outcome = handler.handle(&request("/tmp", "echo hi")).await;

    match outcome {
        ExecutionOutcome::Failure { stage, message, .. } => {
            assert_eq!(stage, Stage::SessionEstablish);
            assert!(message.contains("rejected"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_command_timeout_keeps_partial_output() {
    let container = start_sshd().await;
    let (_file, handler) = handler_with(
        &container,
        SessionOptions::default().with_command_timeout(Some(Duration::from_secs(1))),
    )
    .await;

    let outcome = handler
        .handle(&request("/tmp", "echo before; sleep 10"))
        .await;

    match outcome {
        ExecutionOutcome::Failure {
            stage,
            message,
            partial_output,
        } => {
            assert_eq!(stage, Stage::CommandRun);
            assert!(message.contains("timed out after 1s"), "{}", message);
            assert_eq!(partial_output, Some(b"before\n".to_vec()));
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_unknown_host_key_is_session_failure() {
    let container = start_sshd().await;
    let (_file, handler) = handler_with(
        &container,
        SessionOptions::default().with_host_key_check(HostKeyCheck::KnownHosts),
    )
    .await;

    let outcome = handler.handle(&request("/tmp", "echo hi")).await;

    match outcome {
        ExecutionOutcome::Failure { stage, .. } => assert_eq!(stage, Stage::SessionEstablish),
        other => panic!("expected failure, got {:?}", other),
    }
}
