//! Command dispatch

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::TreeManager;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, OutputFormat, Settings};
use crate::domain::{fixture, NodeInput, NodeValue};
use crate::infrastructure::loader::to_json;
use crate::infrastructure::{RealFileSystem, TreeLoader};
use crate::tree_traits::TreeNodeConvert;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see --help".to_string(),
        ));
    };
    if let Commands::Completion { shell } = command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let settings = Settings::load(cli.config.as_deref())?;
    debug!("settings: {:?}", settings);
    let ctx = Context { cli, settings };

    match command {
        Commands::Show { file } => ctx.show(file.as_deref()),
        Commands::Set {
            file,
            id,
            num,
            denom,
            exp,
        } => ctx.set(file.as_deref(), *id, NodeValue::new(*num, *denom, *exp)),
        Commands::Add {
            file,
            parent,
            child,
            at,
        } => ctx.add(file.as_deref(), *parent, child, *at),
        Commands::Remove { file, id } => ctx.remove(file.as_deref(), *id),
        Commands::Recalc { file } => ctx.recalc(file.as_deref()),
        Commands::Config { command } => ctx.config(command),
        Commands::Completion { .. } => Ok(()),
    }
}

struct Context<'a> {
    cli: &'a Cli,
    settings: Settings,
}

impl Context<'_> {
    fn loader(&self) -> TreeLoader<RealFileSystem> {
        TreeLoader::new(RealFileSystem)
    }

    fn load_input(&self, file: Option<&Path>) -> CliResult<NodeInput> {
        let mut input = match file {
            Some(path) => self.loader().load(path)?,
            None => fixture(),
        };
        input.fill_display_type(self.settings.default_display_type);
        Ok(input)
    }

    #[instrument(level = "debug", skip(self))]
    fn manager(&self, file: Option<&Path>) -> CliResult<TreeManager> {
        let mut manager = TreeManager::new(self.load_input(file)?)?;
        if self.settings.recalculate_on_load {
            manager.recalculate_all();
        }
        Ok(manager)
    }

    fn print(&self, manager: &TreeManager) -> CliResult<()> {
        let format = if self.cli.json {
            OutputFormat::Json
        } else {
            self.settings.output.format
        };
        match format {
            OutputFormat::Tree => {
                let tree = manager
                    .tree()
                    .to_tree_string(manager.root(), self.settings.precision);
                output::info(&tree.to_string().trim_end());
            }
            OutputFormat::Json => output::info(&to_json(&manager.snapshot())?),
        }
        if let Some(out) = &self.cli.out {
            self.loader().save_json(out, &manager.snapshot().data)?;
            output::action("Wrote", &out.display());
        }
        Ok(())
    }

    fn show(&self, file: Option<&Path>) -> CliResult<()> {
        let manager = self.manager(file)?;
        self.print(&manager)
    }

    fn set(&self, file: Option<&Path>, id: i64, value: NodeValue) -> CliResult<()> {
        let mut manager = self.manager(file)?;
        let idx = manager.find(id)?;
        manager.set_value(idx, value)?;
        self.print(&manager)?;
        output::success(&format!("node {} = {} (version {})", id, value, manager.version()));
        Ok(())
    }

    fn add(&self, file: Option<&Path>, parent: i64, child: &Path, at: Option<usize>) -> CliResult<()> {
        let mut manager = self.manager(file)?;
        let parent_idx = manager.find(parent)?;
        let mut subtree = self.loader().load(child)?;
        subtree.fill_display_type(self.settings.default_display_type);
        let child_id = subtree.id;
        manager.add_children(parent_idx, [subtree], at)?;
        self.print(&manager)?;
        output::success(&format!("added node {} under {}", child_id, parent));
        Ok(())
    }

    fn remove(&self, file: Option<&Path>, id: i64) -> CliResult<()> {
        let mut manager = self.manager(file)?;
        let idx = manager.find(id)?;
        if manager.remove_node(idx)?.is_none() {
            output::warning(&format!("node {} has no parent, nothing removed", id));
        }
        self.print(&manager)
    }

    fn recalc(&self, file: Option<&Path>) -> CliResult<()> {
        let mut manager = self.manager(file)?;
        manager.recalculate_all();
        self.print(&manager)
    }

    fn config(&self, command: &ConfigCommands) -> CliResult<()> {
        match command {
            ConfigCommands::Show => {
                output::header("Effective settings");
                output::info(&self.settings.to_toml()?);
            }
            ConfigCommands::Template => output::info(&Settings::template()),
            ConfigCommands::Path => match global_config_path() {
                Some(path) => output::info(&path.display()),
                None => output::warning("no config directory on this platform"),
            },
        }
        Ok(())
    }
}
