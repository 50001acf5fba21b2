use crate::domain::model::{CommandOutcome, Invocation};
use crate::domain::ports::CommandRunner;
use crate::utils::error::{Result, StackError};
use async_trait::async_trait;
use std::future::Future;
use std::io::ErrorKind;
use std::process::{ExitStatus, Stdio};
use tokio::process::{Child, Command};

/// Spawns real processes with the terminal inherited, so `exec sh` and
/// `logs -f` stay interactive.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }

    /// Runs `invocation`, killing the child and discarding redirected output
    /// when `interrupt` resolves first.
    pub async fn run_until<F>(&self, invocation: &Invocation, interrupt: F) -> Result<CommandOutcome>
    where
        F: Future<Output = std::io::Result<()>> + Send,
    {
        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);

        if let Some(dir) = &invocation.working_dir {
            // spawn 對不存在的目錄也回報 NotFound，先檢查以免誤判為缺少程式
            if !dir.is_dir() {
                return Err(StackError::InvalidConfigValueError {
                    field: "working_dir".to_string(),
                    value: dir.display().to_string(),
                    reason: "Directory does not exist".to_string(),
                });
            }
            command.current_dir(dir);
        }

        if let Some(path) = &invocation.stdout_file {
            // 既有檔案絕不覆寫，失敗時的清理才不會刪到先前的備份
            let file = match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(path)
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    return Err(StackError::InvalidConfigValueError {
                        field: "stdout_file".to_string(),
                        value: path.display().to_string(),
                        reason: "Output file already exists".to_string(),
                    });
                }
                Err(e) => return Err(e.into()),
            };
            command.stdout(Stdio::from(file));
        }

        let mut child = match command.kill_on_drop(true).spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                discard_partial_output(invocation);
                return Err(StackError::ToolNotFoundError {
                    program: invocation.program.clone(),
                });
            }
            Err(e) => {
                discard_partial_output(invocation);
                return Err(e.into());
            }
        };

        let status = match wait_or_interrupt(&mut child, interrupt).await {
            Ok(Some(status)) => status,
            Ok(None) => {
                discard_partial_output(invocation);
                return Err(StackError::InterruptedError {
                    command: invocation.command_line(),
                });
            }
            Err(e) => {
                discard_partial_output(invocation);
                return Err(e.into());
            }
        };

        tracing::debug!("{} exited with {:?}", invocation.program, status.code());
        if status.success() {
            Ok(CommandOutcome::success())
        } else {
            discard_partial_output(invocation);
            Ok(CommandOutcome::failure(status.code()))
        }
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutcome> {
        // 只有重導輸出的指令需要攔截 Ctrl-C；互動指令由子行程自行處理
        if invocation.stdout_file.is_some() {
            self.run_until(invocation, tokio::signal::ctrl_c()).await
        } else {
            self
                .run_until(invocation, std::future::pending::<std::io::Result<()>>())
                .await
        }
    }
}

/// `None` when interrupted; the child is killed and reaped.
async fn wait_or_interrupt<F>(child: &mut Child, interrupt: F) -> std::io::Result<Option<ExitStatus>>
where
    F: Future<Output = std::io::Result<()>>,
{
    tokio::select! {
        status = child.wait() => status.map(Some),
        signal = interrupt => {
            signal?;
            tracing::warn!("Interrupted, stopping child process");
            child.kill().await?;
            Ok(None)
        }
    }
}

fn discard_partial_output(invocation: &Invocation) {
    if let Some(path) = &invocation.stdout_file {
        if let Err(e) = std::fs::remove_file(path) {
            tracing::debug!("Could not remove {}: {}", path.display(), e);
        } else {
            tracing::warn!("Removed incomplete output {}", path.display());
        }
    }
}
