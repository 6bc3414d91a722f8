use tycoon_core::leveling::XpProgress;
use tycoon_core::{GameConfig, PlayerProfile, UserProgress};
use tycoon_game::{CommandMeta, CommandReply, SaleOutcome};

const XP_BAR_WIDTH: u64 = 20;

/// Render a command reply as terminal text.
pub fn render_reply(reply: &CommandReply, config: &GameConfig) -> String {
    match reply {
        CommandReply::Sold(outcome) => format_sale(outcome),
        CommandReply::SaleIgnored => "Still serving the last order...".to_owned(),
        CommandReply::TabSwitched(tab) => format!("Switched to the {} tab.", tab.name()),
        CommandReply::Stats(profile) => format_profile(profile, config),
        CommandReply::Refreshed(progress) => {
            format!("Progress reloaded.\n{}", format_progress(progress, config))
        }
        CommandReply::SignedIn(profile) => format!(
            "Welcome, {}!\n{}",
            profile.username,
            format_progress(&profile.progress, config)
        ),
        CommandReply::SignedOut => "Signed out. See you tomorrow, chef!".to_owned(),
        CommandReply::Nothing => String::new(),
        CommandReply::Help(commands) => format_help(commands),
    }
}

pub fn format_sale(outcome: &SaleOutcome) -> String {
    let headline = if outcome.pizzas == 1 {
        "You sold a pizza!".to_owned()
    } else {
        format!("You sold {} pizzas!", outcome.pizzas)
    };

    let mut text = format!(
        "{headline} +{} coins • +{} XP",
        outcome.reward.coins, outcome.reward.xp
    );

    if outcome.leveled_up() {
        text.push_str(&format!("\nLEVEL UP! You reached level {}.", outcome.level));
    }
    if !outcome.authoritative {
        text.push_str("\n(offline: progress saved locally)");
    }

    text
}

pub fn format_progress(progress: &UserProgress, config: &GameConfig) -> String {
    let xp = XpProgress::new(progress.xp, progress.level, config.xp_per_level);
    let mut text = format!(
        "Level {} | {} coins | {}",
        progress.level,
        progress.balance,
        xp_bar(&xp)
    );
    if !progress.source.is_authoritative() {
        text.push_str(" | offline");
    }
    text
}

fn format_profile(profile: &PlayerProfile, config: &GameConfig) -> String {
    let email = profile.identity.email.as_deref().unwrap_or("-");
    format!(
        "{} <{}>\n{}\nPizzas sold: {} | Days played: {}",
        profile.username,
        email,
        format_progress(&profile.progress, config),
        profile.progress.pizzas_sold,
        profile.progress.days_played
    )
}

pub fn xp_bar(progress: &XpProgress) -> String {
    let filled = progress.percent() * XP_BAR_WIDTH / 100;
    let empty = XP_BAR_WIDTH - filled;
    format!(
        "[{}{}] {}/{} XP",
        "#".repeat(filled as usize),
        "-".repeat(empty as usize),
        progress.current,
        progress.required
    )
}

fn format_help(commands: &[CommandMeta]) -> String {
    let mut lines = Vec::with_capacity(commands.len() + 1);
    lines.push("Commands:".to_owned());
    for command in commands {
        let shortcut = command
            .shortcut
            .map(|shortcut| format!(" [{shortcut}]"))
            .unwrap_or_default();
        lines.push(format!("  {:<38} {}{}", command.usage, command.desc, shortcut));
    }
    lines.push("  quit".to_owned());
    lines.join("\n")
}
