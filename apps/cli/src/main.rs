use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{debug, warn};
use textmerger_core::{Tab, WorkspaceStore};
use textmerger_scan::{render_tab, scan_paths, ExclusionMatcher, MergeFormat};
use textmerger_settings::{
    is_supported, langs_dir, JsonFileStore, Settings, Theme, Translator, SUPPORTED_LANGUAGES,
};

#[derive(Parser)]
#[command(
    name = "textmerger-cli",
    about = "Merge text files into one document and manage TextMerger settings",
    author,
    version
)]
struct Cli {
    /// 指定工作區根目錄；預設為目前目錄。 / Workspace root holding `.textmerger/` (defaults to current directory).
    #[arg(long, global = true, value_name = "PATH")]
    workspace: Option<PathBuf>,

    /// 輸出除錯記錄。 / Log debug output to stderr.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 合併檔案內容。 / Merge files and folders into a single document.
    Merge(MergeArgs),
    /// 列出將被合併的檔案。 / List the files a merge would include.
    Scan(ScanArgs),
    /// 檢視或變更主題。 / Show or change the theme.
    #[command(subcommand)]
    Theme(ThemeCommand),
    /// 檢視或變更介面語言。 / Show or change the interface language.
    #[command(subcommand)]
    Locale(LocaleCommand),
    /// 管理排除樣式。 / Manage excluded name patterns.
    #[command(subcommand)]
    Patterns(PatternsCommand),
}

#[derive(Args)]
struct MergeArgs {
    /// 檔案或資料夾。 / Files or directories to merge.
    #[arg(required = true, value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// 輸出格式。 / Output format.
    #[arg(long, value_enum, default_value_t = FormatChoice::Text)]
    format: FormatChoice,

    /// 包含筆記本儲存格輸出。 / Include notebook cell outputs.
    #[arg(long)]
    show_outputs: bool,

    /// 輸出檔案；預設寫到標準輸出。 / Destination file (defaults to stdout).
    #[arg(long, short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Text,
    Html,
}

impl From<FormatChoice> for MergeFormat {
    fn from(choice: FormatChoice) -> Self {
        match choice {
            FormatChoice::Text => MergeFormat::Text,
            FormatChoice::Html => MergeFormat::Html,
        }
    }
}

#[derive(Args)]
struct ScanArgs {
    /// 檔案或資料夾。 / Files or directories to scan.
    #[arg(required = true, value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// 以 JSON 輸出檔案清單。 / Print the file list as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum ThemeCommand {
    /// 顯示目前主題。 / Print the current theme.
    Show,
    /// 設定主題。 / Set the theme.
    Set {
        #[arg(value_enum)]
        theme: ThemeChoice,
    },
    /// 切換深淺色。 / Flip between light and dark.
    Toggle,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ThemeChoice {
    Light,
    Dark,
}

impl From<ThemeChoice> for Theme {
    fn from(choice: ThemeChoice) -> Self {
        match choice {
            ThemeChoice::Light => Theme::Light,
            ThemeChoice::Dark => Theme::Dark,
        }
    }
}

#[derive(Subcommand)]
enum LocaleCommand {
    /// 顯示目前語言。 / Print the current language code.
    Show,
    /// 設定語言代碼。 / Set the language code.
    Set {
        #[arg(value_name = "CODE")]
        code: String,
    },
    /// 在英文與義大利文間切換。 / Switch between English and Italian.
    Toggle,
}

#[derive(Subcommand)]
enum PatternsCommand {
    /// 列出排除樣式。 / List excluded patterns.
    List,
    /// 新增排除樣式。 / Add an excluded pattern.
    Add {
        #[arg(value_name = "PATTERN")]
        pattern: String,
    },
    /// 移除排除樣式。 / Remove an excluded pattern.
    Remove {
        #[arg(value_name = "PATTERN")]
        pattern: String,
    },
    /// 還原預設樣式。 / Restore the default patterns.
    Reset,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let Cli {
        workspace,
        verbose,
        command,
    } = Cli::parse();
    init_logging(verbose);

    let workspace_root = resolve_workspace(workspace)?;
    debug!("workspace root {}", workspace_root.display());
    let mut settings = Settings::open_workspace(&workspace_root)
        .with_context(|| format!("failed to load settings under {}", workspace_root.display()))?;

    match command {
        Commands::Merge(args) => execute_merge(args, &settings),
        Commands::Scan(args) => execute_scan(args, &settings, &workspace_root),
        Commands::Theme(subcommand) => execute_theme_command(subcommand, &mut settings),
        Commands::Locale(subcommand) => execute_locale_command(subcommand, &mut settings),
        Commands::Patterns(subcommand) => execute_patterns_command(subcommand, &mut settings),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

/// Scans `paths` with the stored exclusions into the active tab of a fresh store.
fn collect_into_tab(paths: &[PathBuf], settings: &Settings<JsonFileStore>) -> Result<WorkspaceStore> {
    let inputs = paths
        .iter()
        .map(|path| resolve_input_path(path))
        .collect::<Result<Vec<_>>>()?;
    let matcher = ExclusionMatcher::new(settings.excluded_patterns());
    let report = scan_paths(&inputs, &matcher);
    for error in &report.errors {
        eprintln!("warning: {error}");
    }

    let mut store = WorkspaceStore::new();
    let tab_id = store.active_tab_id().clone();
    store.add_files_to_tab(&tab_id, &report.files);
    Ok(store)
}

fn execute_merge(args: MergeArgs, settings: &Settings<JsonFileStore>) -> Result<()> {
    let store = collect_into_tab(&args.paths, settings)?;
    let tab = store.active_tab();
    if tab.files.is_empty() {
        bail!("no readable files found");
    }

    let merged = render_tab(tab, args.show_outputs, args.format.into());
    match args.output {
        Some(output) => {
            let output = resolve_input_path(&output)?;
            if let Some(parent) = output.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            fs::write(&output, merged)
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!(
                "Merged {} file(s) from '{}' into {}",
                tab.files.len(),
                tab.name,
                output.display()
            );
        }
        None => print!("{merged}"),
    }
    Ok(())
}

fn execute_scan(
    args: ScanArgs,
    settings: &Settings<JsonFileStore>,
    workspace_root: &Path,
) -> Result<()> {
    let store = collect_into_tab(&args.paths, settings)?;
    let tab = store.active_tab();
    if args.json {
        let json = serde_json::to_string_pretty(&tab.files).context("serialize file list")?;
        println!("{json}");
        return Ok(());
    }

    let translator = load_translator(workspace_root, settings.language());
    print_tab(tab, &translator);
    Ok(())
}

fn print_tab(tab: &Tab, translator: &Translator) {
    println!("{}", tab.name);
    for file in &tab.files {
        println!("  {}\t{}", file.path, file.char_count);
    }
    println!(
        "{}: {} | {}: {}",
        translator.text("files.count"),
        tab.files.len(),
        translator.text("files.chars"),
        tab.total_chars()
    );
}

fn load_translator(workspace_root: &Path, language: &str) -> Translator {
    let dir = langs_dir(workspace_root);
    let mut translator = if dir.is_dir() {
        Translator::load_from_dir(&dir).unwrap_or_else(|err| {
            warn!("ignoring translations in {}: {err}", dir.display());
            Translator::builtin()
        })
    } else {
        Translator::builtin()
    };
    if !translator.set_language(language) {
        debug!("no catalog for `{language}`, using {}", translator.active_language());
    }
    translator
}

fn execute_theme_command(command: ThemeCommand, settings: &mut Settings<JsonFileStore>) -> Result<()> {
    match command {
        ThemeCommand::Show => println!("{}", settings.theme()),
        ThemeCommand::Set { theme } => {
            settings.set_theme(theme.into()).context("failed to save theme")?;
            println!("{}", settings.theme());
        }
        ThemeCommand::Toggle => {
            let theme = settings.toggle_theme().context("failed to save theme")?;
            println!("{theme}");
        }
    }
    Ok(())
}

fn execute_locale_command(
    command: LocaleCommand,
    settings: &mut Settings<JsonFileStore>,
) -> Result<()> {
    match command {
        LocaleCommand::Show => println!("{}", settings.language()),
        LocaleCommand::Set { code } => {
            let code = code.trim();
            if !is_supported(code) {
                bail!(
                    "unsupported language '{code}' (expected one of: {})",
                    SUPPORTED_LANGUAGES.join(", ")
                );
            }
            settings.set_language(code).context("failed to save language")?;
            println!("{code}");
        }
        LocaleCommand::Toggle => {
            let code = settings.toggle_language().context("failed to save language")?;
            println!("{code}");
        }
    }
    Ok(())
}

fn execute_patterns_command(
    command: PatternsCommand,
    settings: &mut Settings<JsonFileStore>,
) -> Result<()> {
    match command {
        PatternsCommand::List => {
            for pattern in settings.excluded_patterns() {
                println!("{pattern}");
            }
        }
        PatternsCommand::Add { pattern } => {
            if settings.add_pattern(&pattern).context("failed to save patterns")? {
                println!("Added '{}'", pattern.trim());
            } else {
                println!("Pattern '{}' is empty or already present", pattern.trim());
            }
        }
        PatternsCommand::Remove { pattern } => {
            if settings
                .remove_pattern(&pattern)
                .context("failed to save patterns")?
            {
                println!("Removed '{pattern}'");
            } else {
                bail!("pattern '{pattern}' is not in the list");
            }
        }
        PatternsCommand::Reset => {
            settings.reset_patterns().context("failed to save patterns")?;
            println!(
                "Restored {} default pattern(s)",
                settings.excluded_patterns().len()
            );
        }
    }
    Ok(())
}

fn resolve_workspace(workspace: Option<PathBuf>) -> Result<PathBuf> {
    match workspace {
        Some(path) => resolve_input_path(&path),
        None => std::env::current_dir().context("determine current directory"),
    }
}

fn resolve_input_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()
            .context("determine current directory")?
            .join(path))
    }
}
