use crate::debug_if_enabled;
use crate::error::{OverlayError, Result};
use crate::events::{ClientInfo, WindowHandle, WorkspaceId, WorkspaceTarget};
use serde::Deserialize;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use super::r#trait::WindowManager;

/// Клиент Hyprland через `hyprctl`; каждый вызов ограничен таймаутом
pub struct HyprlandClient {
    command: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct ActiveWorkspace {
    id: i32,
}

#[derive(Debug, Deserialize)]
struct ClientWorkspace {
    id: i32,
}

#[derive(Debug, Deserialize)]
struct HyprClient {
    address: String,
    #[serde(default)]
    mapped: bool,
    #[serde(default)]
    pinned: bool,
    #[serde(default)]
    class: String,
    #[serde(default)]
    title: String,
    workspace: ClientWorkspace,
}

impl From<HyprClient> for ClientInfo {
    fn from(client: HyprClient) -> Self {
        ClientInfo {
            address: WindowHandle::new(client.address),
            workspace: WorkspaceId(client.workspace.id),
            mapped: client.mapped,
            pinned: client.pinned,
            class: client.class,
            title: client.title,
        }
    }
}

impl HyprlandClient {
    pub fn new(command: String, timeout: Duration) -> Self {
        Self { command, timeout }
    }

    async fn run(&self, args: &[&str]) -> Result<Vec<u8>> {
        debug_if_enabled!("{} {}", self.command, args.join(" "));

        let output = timeout(
            self.timeout,
            Command::new(&self.command)
                .args(args)
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| {
            let command = format!("{} {}", self.command, args.join(" "));
            OverlayError::Timeout(format!("{} дольше {:?}", command, self.timeout))
        })??;

        if !output.status.success() {
            return Err(OverlayError::command_failed(
                &self.command,
                output.status,
                &output.stderr,
            ));
        }

        Ok(output.stdout)
    }

    async fn dispatch(&self, args: &[&str]) -> Result<()> {
        let stdout = self.run(args).await?;
        check_dispatch_reply(&self.command, &stdout)
    }
}

/// `hyprctl dispatch` возвращает нулевой код и при ошибке, успех только при ответе "ok"
fn check_dispatch_reply(program: &str, stdout: &[u8]) -> Result<()> {
    let reply = String::from_utf8_lossy(stdout);
    if reply.trim() == "ok" {
        Ok(())
    } else {
        Err(OverlayError::command_failed(program, "exit status: 0", reply.as_bytes()))
    }
}

fn parse_active_workspace(stdout: &[u8]) -> Result<WorkspaceId> {
    let workspace: ActiveWorkspace = serde_json::from_slice(stdout)?;
    Ok(WorkspaceId(workspace.id))
}

fn parse_clients(stdout: &[u8]) -> Result<Vec<ClientInfo>> {
    let clients: Vec<HyprClient> = serde_json::from_slice(stdout)?;
    Ok(clients.into_iter().map(ClientInfo::from).collect())
}

#[async_trait::async_trait]
impl WindowManager for HyprlandClient {
    async fn active_workspace(&self) -> Result<WorkspaceId> {
        let stdout = self.run(&["activeworkspace", "-j"]).await?;
        parse_active_workspace(&stdout)
    }

    async fn clients(&self) -> Result<Vec<ClientInfo>> {
        let stdout = self.run(&["clients", "-j"]).await?;
        parse_clients(&stdout)
    }

    async fn move_window(&self, target: &WorkspaceTarget, handle: &WindowHandle) -> Result<()> {
        let arg = format!("{},address:{}", target, handle);
        self.dispatch(&["dispatch", "movetoworkspacesilent", &arg]).await
    }

    async fn pin_window(&self, handle: &WindowHandle) -> Result<()> {
        let arg = format!("address:{}", handle);
        self.dispatch(&["dispatch", "pin", &arg]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLIENTS_JSON: &str = r#"[
        {
            "address": "0x55d1c2a0",
            "mapped": true,
            "hidden": false,
            "at": [10, 10],
            "size": [700, 250],
            "workspace": { "id": 2, "name": "2" },
            "floating": true,
            "pinned": true,
            "class": "kitty",
            "title": "Quote Display",
            "pid": 4242
        },
        {
            "address": "0x55d1c3b0",
            "mapped": true,
            "workspace": { "id": 2, "name": "2" },
            "class": "firefox",
            "title": "Mozilla Firefox"
        },
        {
            "address": "0x55d1c4c0",
            "mapped": false,
            "workspace": { "id": -98, "name": "special:scratchpad" },
            "class": "",
            "title": ""
        }
    ]"#;

    #[test]
    fn test_parse_active_workspace() {
        let json = br#"{"id": 3, "name": "3", "monitor": "DP-1", "windows": 0}"#;
        assert_eq!(parse_active_workspace(json).unwrap(), WorkspaceId(3));
    }

    #[test]
    fn test_parse_active_workspace_rejects_garbage() {
        assert!(matches!(
            parse_active_workspace(b"HYPRLAND_INSTANCE_SIGNATURE not set"),
            Err(OverlayError::Json(_))
        ));
    }

    #[test]
    fn test_parse_clients() {
        let clients = parse_clients(CLIENTS_JSON.as_bytes()).unwrap();
        assert_eq!(clients.len(), 3);

        assert_eq!(clients[0].address, WindowHandle::new("0x55d1c2a0"));
        assert!(clients[0].pinned);
        assert!(clients[0].is_overlay("Quote Display"));

        assert!(clients[1].occupies(WorkspaceId(2), "Quote Display"));
        assert!(!clients[1].pinned);

        assert_eq!(clients[2].workspace, WorkspaceId(-98));
        assert!(!clients[2].mapped);
    }

    #[test]
    fn test_dispatch_reply() {
        assert!(check_dispatch_reply("hyprctl", b"ok\n").is_ok());
        assert!(check_dispatch_reply("hyprctl", b"No such window found").is_err());
    }

    #[tokio::test]
    async fn test_missing_binary_is_an_error() {
        let client = HyprlandClient::new(
            "hyprctl-definitely-not-installed".to_string(),
            Duration::from_secs(1),
        );
        assert!(matches!(client.active_workspace().await, Err(OverlayError::Io(_))));
    }

    #[tokio::test]
    async fn test_slow_command_times_out_with_full_command_line() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("slow-hyprctl");
        std::fs::write(&tool, "#!/bin/sh\nsleep 5\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let client = HyprlandClient::new(
            tool.to_string_lossy().into_owned(),
            Duration::from_millis(200),
        );
        match client.active_workspace().await {
            Err(OverlayError::Timeout(message)) => assert!(message.contains("activeworkspace -j")),
            other => panic!("ожидался таймаут, получено {:?}", other),
        }
    }
}
