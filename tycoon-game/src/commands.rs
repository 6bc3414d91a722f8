use anyhow::{Context as _, bail};
use tycoon_api::AuthoritativeService;
use tycoon_core::{ExternalIdentity, PlayerProfile, SaleAction, UserProgress};

use crate::auth::{AuthEvent, AuthNotification, IdentitySession};
use crate::reconciler::SaleOutcome;
use crate::session::{GameSession, Tab};

#[derive(Debug, PartialEq, Eq)]
pub struct CommandMeta {
    pub name: &'static str,
    pub desc: &'static str,
    pub usage: &'static str,
    pub shortcut: Option<&'static str>,
}

pub const COMMANDS: &[CommandMeta] = &[
    CommandMeta {
        name: "sell",
        desc: "Sell one pizza.",
        usage: "sell",
        shortcut: Some("<enter>"),
    },
    CommandMeta {
        name: "bulk",
        desc: "Sell a whole batch of pizzas at once.",
        usage: "bulk",
        shortcut: Some("q"),
    },
    CommandMeta {
        name: "tab",
        desc: "Switch between the kitchen, shop and profile tabs.",
        usage: "tab <kitchen|shop|profile>",
        shortcut: Some("1 / 2 / 3"),
    },
    CommandMeta {
        name: "stats",
        desc: "Show balance, level and counters.",
        usage: "stats",
        shortcut: None,
    },
    CommandMeta {
        name: "refresh",
        desc: "Reload progress from the backend.",
        usage: "refresh",
        shortcut: None,
    },
    CommandMeta {
        name: "signin",
        desc: "Sign in as a player.",
        usage: "signin <id> <email> [display name]",
        shortcut: None,
    },
    CommandMeta {
        name: "signout",
        desc: "Sign the current player out.",
        usage: "signout",
        shortcut: None,
    },
    CommandMeta {
        name: "auth",
        desc: "Feed a raw identity-provider notification.",
        usage: "auth <json>",
        shortcut: None,
    },
    CommandMeta {
        name: "help",
        desc: "List commands.",
        usage: "help",
        shortcut: None,
    },
];

/// A discrete player action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameCommand {
    Sell,
    BulkSell,
    SwitchTab(Tab),
    Stats,
    Refresh,
    SignIn(ExternalIdentity),
    SignOut,
    Auth(AuthEvent),
    Help,
}

/// What happened, for the front end to display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandReply {
    Sold(SaleOutcome),
    SaleIgnored,
    TabSwitched(Tab),
    Stats(PlayerProfile),
    Refreshed(UserProgress),
    SignedIn(PlayerProfile),
    SignedOut,
    Nothing,
    Help(&'static [CommandMeta]),
}

fn usage_of(name: &str) -> &'static str {
    COMMANDS
        .iter()
        .find(|command| command.name == name)
        .map_or("help", |command| command.usage)
}

/// Parse one input line. A blank line sells a pizza.
pub fn parse_command(raw: &str) -> anyhow::Result<GameCommand> {
    let line = raw.trim();
    if line.is_empty() {
        return Ok(GameCommand::Sell);
    }

    let (head, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(head, rest)| (head, rest.trim()));
    let head = head.to_ascii_lowercase();

    if let Some(tab) = Tab::parse(&head).filter(|_| head.len() == 1) {
        return Ok(GameCommand::SwitchTab(tab));
    }

    let command = match head.as_str() {
        "sell" => GameCommand::Sell,
        "bulk" | "q" => GameCommand::BulkSell,
        "stats" => GameCommand::Stats,
        "refresh" => GameCommand::Refresh,
        "signout" => GameCommand::SignOut,
        "help" => GameCommand::Help,
        "tab" => match Tab::parse(rest) {
            Some(tab) => GameCommand::SwitchTab(tab),
            None => bail!("usage: `{}`", usage_of("tab")),
        },
        "signin" => GameCommand::SignIn(parse_identity(rest)?),
        "auth" => {
            let notification: AuthNotification = serde_json::from_str(rest)
                .with_context(|| format!("usage: `{}`", usage_of("auth")))?;
            GameCommand::Auth(notification.into_event()?)
        }
        other => bail!("unknown command `{other}`; try `help`"),
    };

    Ok(command)
}

fn parse_identity(rest: &str) -> anyhow::Result<ExternalIdentity> {
    let mut words = rest.split_whitespace();
    let (Some(id), Some(email)) = (words.next(), words.next()) else {
        bail!("usage: `{}`", usage_of("signin"));
    };
    let display_name = Some(words.collect::<Vec<_>>().join(" ")).filter(|name| !name.is_empty());

    let identity = ExternalIdentity {
        id: id.to_owned(),
        email: Some(email.to_owned()),
        display_name,
        avatar_url: None,
        provider: Some("cli".to_owned()),
    };
    identity.validate()?;
    Ok(identity)
}

impl<S> GameSession<S>
where
    S: AuthoritativeService,
{
    pub async fn dispatch(&mut self, command: GameCommand) -> anyhow::Result<CommandReply> {
        let reply = match command {
            GameCommand::Sell => self.sale_reply(SaleAction::Sell).await?,
            GameCommand::BulkSell => self.sale_reply(SaleAction::BulkSell).await?,
            GameCommand::SwitchTab(tab) => {
                self.switch_tab(tab);
                CommandReply::TabSwitched(tab)
            }
            GameCommand::Stats => match self.profile() {
                Some(profile) => CommandReply::Stats(profile.clone()),
                None => bail!("no player is signed in"),
            },
            GameCommand::Refresh => CommandReply::Refreshed(self.refresh().await?),
            GameCommand::SignIn(identity) => {
                let session = IdentitySession {
                    access_token: None,
                    user: identity,
                };
                self.auth_reply(AuthEvent::SignedIn(session)).await?
            }
            GameCommand::SignOut => self.auth_reply(AuthEvent::SignedOut).await?,
            GameCommand::Auth(event) => self.auth_reply(event).await?,
            GameCommand::Help => CommandReply::Help(COMMANDS),
        };

        Ok(reply)
    }

    async fn sale_reply(&mut self, action: SaleAction) -> anyhow::Result<CommandReply> {
        Ok(match self.sell(action).await? {
            Some(outcome) => CommandReply::Sold(outcome),
            None => CommandReply::SaleIgnored,
        })
    }

    async fn auth_reply(&mut self, event: AuthEvent) -> anyhow::Result<CommandReply> {
        let signing_out = matches!(event, AuthEvent::SignedOut);
        Ok(match self.handle_auth_event(event).await? {
            Some(profile) => CommandReply::SignedIn(profile),
            None if signing_out => CommandReply::SignedOut,
            None => CommandReply::Nothing,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tycoon_core::GameConfig;
    use tycoon_store::LocalProgressStore;

    use super::{COMMANDS, CommandReply, GameCommand, parse_command};
    use crate::auth::AuthEvent;
    use crate::session::{GameSession, Tab};
    use crate::test_support::StubService;

    #[test]
    fn shortcuts_map_to_commands() {
        assert_eq!(parse_command("").unwrap(), GameCommand::Sell);
        assert_eq!(parse_command("   ").unwrap(), GameCommand::Sell);
        assert_eq!(parse_command("q").unwrap(), GameCommand::BulkSell);
        assert_eq!(parse_command("2").unwrap(), GameCommand::SwitchTab(Tab::Shop));
        assert_eq!(
            parse_command("tab Profile").unwrap(),
            GameCommand::SwitchTab(Tab::Profile)
        );
    }

    #[test]
    fn signin_takes_id_email_and_optional_name() {
        let GameCommand::SignIn(identity) =
            parse_command("signin u1 chef@pizza.test Chef Mario").unwrap()
        else {
            panic!("expected sign-in");
        };
        assert_eq!(identity.id, "u1");
        assert_eq!(identity.display_name.as_deref(), Some("Chef Mario"));
        assert_eq!(identity.username(), "Chef Mario");

        assert!(parse_command("signin u1").is_err());
    }

    #[test]
    fn auth_command_accepts_provider_json() {
        assert_eq!(
            parse_command(r#"auth {"event": "SIGNED_OUT"}"#).unwrap(),
            GameCommand::Auth(AuthEvent::SignedOut)
        );
        assert!(parse_command("auth not-json").is_err());
    }

    #[test]
    fn unknown_commands_are_errors() {
        assert!(parse_command("bake").is_err());
        assert!(parse_command("tab oven").is_err());
    }

    #[test]
    fn every_command_has_usage() {
        for command in COMMANDS {
            assert!(command.usage.starts_with(command.name));
        }
    }

    #[tokio::test]
    async fn dispatch_runs_a_full_round() {
        let service = Arc::new(StubService::offline());
        let store = LocalProgressStore::memory("test");
        let mut session = GameSession::new(service, store, GameConfig::default());

        let reply = session
            .dispatch(parse_command("signin u1 chef@pizza.test").unwrap())
            .await
            .unwrap();
        assert!(matches!(reply, CommandReply::SignedIn(ref profile) if profile.username == "chef"));

        let CommandReply::Sold(outcome) = session.dispatch(GameCommand::Sell).await.unwrap() else {
            panic!("expected a sale");
        };
        assert_eq!(outcome.balance, 110);
        assert!(!outcome.authoritative);

        assert_eq!(
            session.dispatch(GameCommand::SwitchTab(Tab::Shop)).await.unwrap(),
            CommandReply::TabSwitched(Tab::Shop)
        );
        assert_eq!(
            session.dispatch(GameCommand::SignOut).await.unwrap(),
            CommandReply::SignedOut
        );
        assert!(session.dispatch(GameCommand::Stats).await.is_err());
    }
}
