//! Console output formatter for middleware results

use colored::Colorize;
use sb_application::{ChatReply, TransferReport};
use sb_domain::{AssistantConfig, ChatHistory, FileList, ModelRole};

/// Formats middleware results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Greeting and backend readiness
    pub fn format_status(greeting: &str, backend_ready: bool) -> String {
        let mut output = String::new();
        output.push_str(&Self::header("SuperBuilder Middleware"));
        output.push('\n');
        output.push_str(&format!("{} {}\n", "Middleware:".cyan().bold(), greeting));

        let backend = if backend_ready {
            "ready".green()
        } else {
            "not responding".red()
        };
        output.push_str(&format!("{} {}\n", "Backend:".cyan().bold(), backend));
        output
    }

    /// Chat history, raw payload first
    pub fn format_history(history: &ChatHistory) -> String {
        let mut output = String::new();
        output.push_str(&Self::section_header(&format!(
            "Chat History ({} sessions)",
            history.len()
        )));

        if history.raw().trim().is_empty() {
            output.push_str(&format!("{}\n", "(no sessions)".dimmed()));
            return output;
        }

        output.push_str(history.raw());
        output.push('\n');
        if !history.is_well_formed() {
            output.push_str(&format!(
                "{} payload is not a list of sessions\n",
                "Warning:".yellow().bold()
            ));
        } else if history.skipped() > 0 {
            output.push_str(&format!(
                "{} {} entries without a session id\n",
                "Warning:".yellow().bold(),
                history.skipped()
            ));
        }
        output
    }

    /// Knowledge-base documents
    pub fn format_file_list(files: &FileList) -> String {
        let mut output = String::new();
        output.push_str(&Self::section_header(&format!(
            "Knowledge Base ({} files)",
            files.len()
        )));

        if !files.is_well_formed() {
            output.push_str(files.raw());
            output.push('\n');
            return output;
        }
        if files.is_empty() {
            output.push_str(&format!("{}\n", "(no files)".dimmed()));
            return output;
        }
        for file in files.files() {
            output.push_str(&format!("  {}\n", file));
        }
        output
    }

    /// Outcome of an upload or download
    pub fn format_transfer(report: &TransferReport) -> String {
        let outcome = if report.completed {
            "done".green()
        } else {
            "ended early".yellow()
        };
        format!(
            "{} {} ({} updates) {}",
            format!("{}:", report.operation).green().bold(),
            outcome,
            report.updates,
            report.detail.dimmed()
        )
    }

    /// Active assistant and its selection, in write order
    pub fn format_assistant(assistant: &AssistantConfig) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{} {}\n",
            "Assistant:".cyan().bold(),
            assistant.short_name().bold()
        ));

        for role in ModelRole::WRITE_ORDER {
            let label = format!("{:<16}", format!("{}:", role));
            match assistant.selected(role) {
                Some(model) => {
                    output.push_str(&format!("  {} {}\n", label, model.full_name.yellow()))
                }
                None => output.push_str(&format!("  {} {}\n", label, "(none)".red())),
            }
        }

        let unlisted = assistant.unlisted_selections();
        if !unlisted.is_empty() {
            let roles = unlisted
                .iter()
                .map(ModelRole::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            output.push_str(&format!(
                "{} selected {} not in the catalog\n",
                "Warning:".yellow().bold(),
                roles
            ));
        }
        output
    }

    /// Catalog grouped by role, marking the current selection
    pub fn format_catalog(assistant: &AssistantConfig) -> String {
        let mut output = String::new();

        for role in ModelRole::WRITE_ORDER {
            output.push_str(&Self::section_header(&Self::capitalize(&role.to_string())));
            let current = assistant.selected(role).map(|m| m.full_name.as_str());

            let mut any = false;
            for model in assistant.catalog_for(role) {
                any = true;
                if Some(model.full_name.as_str()) == current {
                    output.push_str(&format!(
                        "{} {}\n",
                        "*".green().bold(),
                        model.full_name.green()
                    ));
                } else {
                    output.push_str(&format!("  {}\n", model.full_name));
                }
            }
            if !any {
                output.push_str(&format!("  {}\n", "(none)".dimmed()));
            }
        }

        let others: Vec<_> = assistant
            .catalog()
            .iter()
            .filter(|m| m.role().is_none())
            .collect();
        if !others.is_empty() {
            output.push_str(&Self::section_header("Other"));
            for model in others {
                output.push_str(&format!(
                    "  {} ({})\n",
                    model.full_name,
                    model.model_type.dimmed()
                ));
            }
        }
        output
    }

    /// Trailer printed after a streamed reply
    pub fn format_chat_summary(reply: &ChatReply) -> String {
        format!(
            "\n{}\n",
            format!(
                "session {} · {} fragments · {} chars",
                reply.session_id,
                reply.fragment_count,
                reply.text.chars().count()
            )
            .dimmed()
        )
    }

    /// A labelled line, e.g. the server's reply to a configuration write
    pub fn format_message(label: &str, message: &str) -> String {
        if message.is_empty() {
            format!("{} {}", label.green().bold(), "(no message)".dimmed())
        } else {
            format!("{} {}", label.green().bold(), message)
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn capitalize(text: &str) -> String {
        let mut chars = text.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}
