/*
[INPUT]:  Started AuthFlowController, run mode, shutdown token
[OUTPUT]: Rendered flow status and the final run outcome
[POS]:    CLI runner - drives the flow from a terminal
[UPDATE]: When terminal prompts or unattended behaviour change
*/

use anyhow::{Context, Result};
use console::style;
use dialoguer::{Select, theme::ColorfulTheme};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use wallet_link_adapter::{AuthFlowController, AuthFlowState, FlowFailure, UiState};

/// Upper bound on clicks in unattended mode (connect, sign, plus reconnects)
const MAX_UNATTENDED_CLICKS: usize = 4;

/// How the primary control gets clicked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Prompt for every action
    Interactive,
    /// Click until the flow succeeds or fails
    Unattended,
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Linked(String),
    Failed(FlowFailure),
    Cancelled,
    Quit,
}

enum Action {
    Primary,
    SwitchWallet,
    Quit,
}

/// Drive a started controller until it reaches an outcome
pub async fn run(
    controller: &mut AuthFlowController,
    mode: RunMode,
    shutdown: CancellationToken,
) -> Result<RunOutcome> {
    let mut clicks = 0usize;

    loop {
        let ui = controller.ui();
        render(&ui);

        if let Some(outcome) = finished(controller.state()) {
            return Ok(outcome);
        }

        let action = match mode {
            RunMode::Unattended => {
                if let Some(failure) = controller.state().failure() {
                    return Ok(RunOutcome::Failed(failure.clone()));
                }
                if !ui.button_enabled || clicks >= MAX_UNATTENDED_CLICKS {
                    debug!(clicks, enabled = ui.button_enabled, "unattended run stalled");
                    return Ok(RunOutcome::Quit);
                }
                Action::Primary
            }
            RunMode::Interactive => {
                let Some(action) = prompt_action(&ui, &shutdown).await? else {
                    return Ok(RunOutcome::Cancelled);
                };
                action
            }
        };

        match action {
            Action::Primary => {
                clicks += 1;
                controller.click();
                tokio::select! {
                    _ = shutdown.cancelled() => return Ok(RunOutcome::Cancelled),
                    _ = controller.settle() => {}
                }
            }
            Action::SwitchWallet => {
                let names: Vec<String> = controller
                    .session()
                    .registry()
                    .list()
                    .iter()
                    .map(|wallet| {
                        format!("{} ({:?})", wallet.name, wallet.capability.ready_state())
                    })
                    .collect();
                let current = controller
                    .connection()
                    .and_then(|view| {
                        controller
                            .session()
                            .registry()
                            .list()
                            .iter()
                            .position(|wallet| wallet.name == view.wallet)
                    })
                    .unwrap_or(0);
                let Some(index) = prompt_select("Select wallet", names, current, &shutdown).await?
                else {
                    return Ok(RunOutcome::Cancelled);
                };
                let name = controller
                    .session()
                    .registry()
                    .list()
                    .get(index)
                    .map(|wallet| wallet.name.clone())
                    .context("selected wallet index out of range")?;
                controller.select_wallet(&name).await;
            }
            Action::Quit => return Ok(RunOutcome::Quit),
        }
    }
}

fn finished(state: &AuthFlowState) -> Option<RunOutcome> {
    match state {
        AuthFlowState::Succeeded { message } => {
            info!("wallet link completed");
            Some(RunOutcome::Linked(message.clone()))
        }
        AuthFlowState::Failed(failure) if failure.kind.is_terminal() => {
            Some(RunOutcome::Failed(failure.clone()))
        }
        _ => None,
    }
}

/// Print the projected UI to stdout
pub fn render(ui: &UiState) {
    let status = style(ui.status.as_str());
    let status = if !ui.controls_visible && !ui.status.contains("Error") {
        status.green().bold()
    } else if ui.status.contains("Error") {
        status.red()
    } else {
        status.cyan()
    };
    println!("{status}");
    if let Some(info) = ui.wallet_info.as_deref().filter(|_| ui.controls_visible) {
        println!("{}", style(info).dim());
    }
}

async fn prompt_action(ui: &UiState, shutdown: &CancellationToken) -> Result<Option<Action>> {
    let mut items = Vec::new();
    let mut actions = Vec::new();
    if ui.button_enabled {
        items.push(ui.button_label.text().to_string());
        actions.push(Action::Primary);
    }
    if ui.selector_enabled {
        items.push("Switch wallet".to_string());
        actions.push(Action::SwitchWallet);
    }
    items.push("Quit".to_string());
    actions.push(Action::Quit);

    let Some(index) = prompt_select("Select action", items, 0, shutdown).await? else {
        return Ok(None);
    };
    Ok(actions.into_iter().nth(index))
}

/// Blocking dialoguer prompt, abandoned if shutdown fires first
async fn prompt_select(
    prompt: &'static str,
    items: Vec<String>,
    default: usize,
    shutdown: &CancellationToken,
) -> Result<Option<usize>> {
    let handle = tokio::task::spawn_blocking(move || {
        Select::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .items(&items)
            .default(default)
            .interact()
    });

    tokio::select! {
        _ = shutdown.cancelled() => Ok(None),
        joined = handle => {
            let index = joined.context("prompt task panicked")?.context("read selection")?;
            Ok(Some(index))
        }
    }
}
