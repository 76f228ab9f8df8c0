use std::path::Path;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

use crate::{
    adapters::{browser::FileBrowser, controllers::file_controller::FileController, view},
    application::error::ApplicationError,
    domain::{filters::FilterField, models::file_type::resolve_file_type},
};

const HELP: &str = "\
Commands:
  set <field> <value>   edit a draft filter (upload_date, min_size, max_size, file_type, search)
  unset <field>         clear one draft filter
  clear                 clear all draft filters
  draft                 show draft and applied filters
  apply                 apply the draft filters and reload
  refresh               reload with the applied filters
  delete <id>           delete a file
  download <id>         download a file
  upload <path>         upload a file
  savings               show storage savings
  help                  show this text
  quit                  leave
";

#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    Continue(String),
    Quit,
}

pub struct BrowseController;

impl BrowseController {
    /// Runs the interactive session on stdin/stdout until `quit` or EOF.
    pub async fn run(browser: &FileBrowser) -> std::io::Result<()> {
        let mut stdout = tokio::io::stdout();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        browser.savings().await;
        let _ = browser.refresh().await;
        let intro = format!("{}\n{}", browser.savings_view(), browser.list_view());
        stdout.write_all(intro.as_bytes()).await?;

        loop {
            stdout.write_all(b"> ").await?;
            stdout.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            match Self::handle_line(browser, &line).await {
                Reply::Continue(out) => stdout.write_all(out.as_bytes()).await?,
                Reply::Quit => break,
            }
        }
        Ok(())
    }

    pub async fn handle_line(browser: &FileBrowser, line: &str) -> Reply {
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        debug!("browse command: {}", command);

        let out = match command {
            "" => String::new(),
            "quit" | "exit" => return Reply::Quit,
            "help" => HELP.to_string(),
            "set" => {
                let (name, value) = rest.split_once(' ').unwrap_or((rest, ""));
                Self::set(browser, name, value.trim())
            }
            "unset" => Self::set(browser, rest, ""),
            "clear" => {
                browser.clear_filters();
                "Draft filters cleared\n".to_string()
            }
            "draft" => Self::draft(browser),
            "apply" => Self::render(browser, browser.apply_filters().await),
            "refresh" => Self::render(browser, browser.refresh().await),
            "delete" if !rest.is_empty() => {
                Self::or_error(FileController::delete(browser, rest).await)
            }
            "download" if !rest.is_empty() => {
                Self::or_error(FileController::download(browser, rest).await)
            }
            "upload" if !rest.is_empty() => {
                Self::or_error(FileController::upload(browser, Path::new(rest), None).await)
            }
            "savings" => browser.savings_view().to_string(),
            _ => format!("Unknown command '{}', try 'help'\n", line),
        };
        Reply::Continue(out)
    }

    fn set(browser: &FileBrowser, name: &str, value: &str) -> String {
        let value = match name.parse::<FilterField>() {
            Ok(FilterField::FileType) => resolve_file_type(value).unwrap_or(value),
            _ => value,
        };

        match browser.set_filter_by_name(name, value) {
            Ok(field) if value.is_empty() => format!("{} cleared (not applied)\n", field),
            Ok(field) => format!("{} = {} (not applied)\n", field, value),
            Err(e) => format!("{}\n", e),
        }
    }

    fn draft(browser: &FileBrowser) -> String {
        let mut out = format!(
            "Draft:\n{}Applied:\n{}",
            view::render_filters(&browser.draft()),
            view::render_filters(&browser.committed())
        );
        if browser.has_pending_changes() {
            out.push_str("Unapplied changes, run 'apply' to reload\n");
        }
        out
    }

    fn render(browser: &FileBrowser, result: Result<(), ApplicationError>) -> String {
        let listing = browser.list_view().to_string();
        match result {
            Ok(()) => listing,
            Err(e) => format!("{}\n{}", e, listing),
        }
    }

    fn or_error(result: Result<String, ApplicationError>) -> String {
        result.unwrap_or_else(|e| format!("{}\n", e))
    }
}
