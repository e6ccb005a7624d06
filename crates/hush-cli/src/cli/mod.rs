use clap::Parser;
use hush_reconcile::Action;

pub mod global;

pub use global::{GlobalFlags, OutputFormat};

pub const USAGE_HINT: &str = "No action selected. Use --telemetry, --cortana, --context-menu, \
                              --copilot or --integrity (see --help).";

/// Top-level CLI parser for the `hush` binary.
///
/// One feature per invocation; when several are given, the first in
/// declaration order wins.
#[derive(Debug, Parser)]
#[command(
    name = "hush",
    version,
    about = "Switch off Windows telemetry, Cortana and Copilot. Requires an elevated shell."
)]
pub struct Cli {
    /// Disable telemetry: policy values, the DiagTrack service, CEIP tasks
    #[arg(long)]
    pub telemetry: bool,

    /// Disable Cortana personal-assistant features (Windows Search stays)
    #[arg(long, visible_alias = "voice-assistant")]
    pub cortana: bool,

    /// Activate the classic context menu for the current user
    #[arg(long)]
    pub context_menu: bool,

    /// Disable Windows Copilot for the current user
    #[arg(long, visible_alias = "ai-overlay")]
    pub copilot: bool,

    /// Run the system file checker and DISM component store repair
    #[arg(long)]
    pub integrity: bool,

    /// Activate the classic context menu and restart Explorer
    #[arg(long)]
    pub restart_explorer: bool,

    /// Output format: text, json
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Quiet mode (errors only on the console)
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// The selected action, or `None` when no feature flag was given.
    #[must_use]
    pub const fn action(&self) -> Option<Action> {
        if self.telemetry {
            Some(Action::Telemetry)
        } else if self.cortana {
            Some(Action::VoiceAssistant)
        } else if self.context_menu {
            Some(Action::ContextMenu {
                restart_shell: self.restart_explorer,
            })
        } else if self.copilot {
            Some(Action::AiOverlay)
        } else if self.integrity {
            Some(Action::Integrity)
        } else if self.restart_explorer {
            Some(Action::ContextMenu {
                restart_shell: true,
            })
        } else {
            None
        }
    }

    #[must_use]
    pub const fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use hush_reconcile::Action;

    use super::{Cli, OutputFormat};

    fn action(args: &[&str]) -> Option<Action> {
        let argv = std::iter::once("hush").chain(args.iter().copied());
        Cli::try_parse_from(argv).expect("cli should parse").action()
    }

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_flag_selects_nothing() {
        assert_eq!(action(&[]), None);
        assert_eq!(action(&["--verbose", "--format", "json"]), None);
    }

    #[test]
    fn each_flag_selects_its_feature() {
        assert_eq!(action(&["--telemetry"]), Some(Action::Telemetry));
        assert_eq!(action(&["--cortana"]), Some(Action::VoiceAssistant));
        assert_eq!(action(&["--voice-assistant"]), Some(Action::VoiceAssistant));
        assert_eq!(
            action(&["--context-menu"]),
            Some(Action::ContextMenu {
                restart_shell: false
            })
        );
        assert_eq!(action(&["--copilot"]), Some(Action::AiOverlay));
        assert_eq!(action(&["--ai-overlay"]), Some(Action::AiOverlay));
        assert_eq!(action(&["--integrity"]), Some(Action::Integrity));
    }

    #[test]
    fn first_matching_flag_wins() {
        assert_eq!(
            action(&["--copilot", "--telemetry"]),
            Some(Action::Telemetry)
        );
        assert_eq!(
            action(&["--integrity", "--cortana"]),
            Some(Action::VoiceAssistant)
        );
        assert_eq!(
            action(&["--copilot", "--restart-explorer"]),
            Some(Action::AiOverlay)
        );
    }

    #[test]
    fn restart_explorer_selects_enhanced_context_menu() {
        let enhanced = Some(Action::ContextMenu {
            restart_shell: true,
        });
        assert_eq!(action(&["--restart-explorer"]), enhanced);
        assert_eq!(action(&["--context-menu", "--restart-explorer"]), enhanced);
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        assert!(Cli::try_parse_from(["hush", "--format", "xml", "--telemetry"]).is_err());
    }

    #[test]
    fn global_flags_extraction_copies_values() {
        let cli = Cli::try_parse_from(["hush", "-q", "-f", "json", "--telemetry"])
            .expect("cli should parse");
        let flags = cli.global_flags();
        assert_eq!(flags.format, OutputFormat::Json);
        assert!(flags.quiet);
        assert!(!flags.verbose);
    }
}
