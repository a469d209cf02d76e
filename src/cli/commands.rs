//! Command dispatch: each subcommand loads containers into one forest,
//! runs the tree operation and writes changed containers back.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument, warn};

use crate::application::services::{open_tree, read_tree, write_tree};
use crate::cli::args::{Cli, Commands, ConfigCommands, TreeLocation};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, RenderStyle, Settings};
use crate::domain::{DomainError, Forest, MergeMode, NodeId, TreeOp, TreeOutcome};
use crate::infrastructure::{ContainerError, DirGroup, Group};
use crate::tree_traits::TreeNodeConvert;

pub fn execute_command(cli: &Cli, settings: &Settings) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Init { container, name }) => _init(container, name.as_deref(), settings),
        Some(Commands::Show {
            source,
            from_root,
            style,
        }) => _show(source, *from_root, style.unwrap_or(settings.render)),
        Some(Commands::Get { source }) => _get(source),
        Some(Commands::Add {
            container,
            parent,
            name,
            tree,
        }) => {
            let parent = TreeLocation {
                container: container.clone(),
                path: parent.clone(),
                tree: tree.clone(),
            };
            _add(&parent, name)
        }
        Some(Commands::Cut {
            source,
            out,
            metadata,
        }) => _cut(source, out, metadata.unwrap_or(settings.merge_mode)),
        Some(Commands::Graft {
            source,
            onto,
            onto_tree,
            at,
            metadata,
        }) => {
            let target = TreeLocation {
                container: onto.clone().unwrap_or_else(|| source.container.clone()),
                path: at.clone(),
                tree: onto_tree.clone(),
            };
            _graft(source, &target, metadata.unwrap_or(settings.merge_mode))
        }
        Some(Commands::Config { command }) => _config(command, settings),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage("no command given; see --help".to_string())),
    }
}

// ============================================================
// CONTAINER WORKSPACE
// ============================================================

/// All trees of one container, read into a shared forest.
#[derive(Debug)]
struct Container {
    path: PathBuf,
    roots: Vec<NodeId>,
}

impl Container {
    fn load(forest: &mut Forest, path: &Path) -> CliResult<Self> {
        let file = DirGroup::open(path)?;
        let mut roots = Vec::new();
        for group in file.groups()? {
            let top = read_tree(forest, &group)?;
            roots.push(forest.root(top)?.unwrap_or(top));
        }
        debug!(path = %path.display(), trees = roots.len(), "loaded container");
        Ok(Self {
            path: path.to_path_buf(),
            roots,
        })
    }

    /// Load `path` if it is a container, otherwise start an empty one there.
    fn load_or_new(forest: &mut Forest, path: &Path) -> CliResult<Self> {
        match DirGroup::open(path) {
            Ok(_) => Self::load(forest, path),
            Err(ContainerError::NotAContainer(_)) => Ok(Self {
                path: path.to_path_buf(),
                roots: Vec::new(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// The root of the tree called `name`, or the only tree if `name` is None.
    fn tree(&self, forest: &Forest, name: Option<&str>) -> CliResult<NodeId> {
        match name {
            Some(name) => {
                for &root in &self.roots {
                    if forest.name(root)? == name {
                        return Ok(root);
                    }
                }
                Err(DomainError::KeyNotFound(name.to_string()).into())
            }
            None => match self.roots.as_slice() {
                [root] => Ok(*root),
                [] => Err(CliError::InvalidArgs(format!(
                    "{} holds no trees",
                    self.path.display()
                ))),
                _ => Err(CliError::InvalidArgs(format!(
                    "{} holds {} trees; choose one with --tree",
                    self.path.display(),
                    self.roots.len()
                ))),
            },
        }
    }

    /// Fail if the container already holds a tree called `name`.
    fn ensure_tree_name_free(&self, forest: &Forest, name: &str) -> CliResult<()> {
        for &root in &self.roots {
            if forest.name(root)? == name {
                return Err(CliError::InvalidArgs(format!(
                    "{} already holds a tree named '{}'",
                    self.path.display(),
                    name
                )));
            }
        }
        Ok(())
    }

    /// Rewrite the container from its trees. The new content is staged next
    /// to the old one and only swapped in once every tree is written.
    fn save(&self, forest: &mut Forest) -> CliResult<()> {
        let staged = DirGroup::stage(&self.path)?;
        for &root in &self.roots {
            if let Err(e) = write_tree(forest, root, &staged) {
                if let Err(cleanup) = staged.abandon() {
                    warn!(error = %cleanup, "could not remove staging directory");
                }
                return Err(e.into());
            }
        }
        staged.commit(&self.path)?;
        debug!(path = %self.path.display(), trees = self.roots.len(), "saved container");
        Ok(())
    }
}

/// Resolve a node path below `root`; an empty path or `/` is the root.
fn resolve(forest: &mut Forest, root: NodeId, path: &str) -> CliResult<NodeId> {
    if path.trim_matches('/').is_empty() {
        return Ok(root);
    }
    match forest.tree(root, TreeOp::Get(path.to_string()))? {
        TreeOutcome::Found(id) => Ok(id),
        other => Err(CliError::Usage(format!("unexpected tree outcome: {:?}", other))),
    }
}

/// Whether both paths name the same existing directory.
fn same_container(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn display_path(forest: &Forest, id: NodeId) -> CliResult<String> {
    Ok(match forest.path(id)? {
        Some(path) if path.is_empty() => "/".to_string(),
        Some(path) => path,
        None => forest.name(id)?.to_string(),
    })
}

// ============================================================
// COMMANDS
// ============================================================

#[instrument]
fn _init(container: &Path, name: Option<&str>, settings: &Settings) -> CliResult<()> {
    let name = name.unwrap_or(&settings.root_name);
    let mut forest = Forest::new();
    let root = forest.new_root(name);
    let staged = DirGroup::stage(container)?;
    write_tree(&mut forest, root, &staged)?;
    staged.commit(container)?;
    output::success(&format!(
        "created {} with root '{}'",
        container.display(),
        name
    ));
    Ok(())
}

#[instrument]
fn _show(source: &TreeLocation, from_root: bool, style: RenderStyle) -> CliResult<()> {
    let mut forest = Forest::new();
    let file = DirGroup::open(&source.container)?;
    let root = open_tree(&mut forest, &file, source.tree.as_deref())?;
    let node = resolve(&mut forest, root, &source.path)?;

    let rendered = match style {
        RenderStyle::Unicode => {
            let start = if from_root { root } else { node };
            forest.to_tree_string(start)?.to_string()
        }
        RenderStyle::Connectors => match forest.tree(node, TreeOp::Show { from_root })? {
            TreeOutcome::Shown(text) => text,
            other => return Err(CliError::Usage(format!("unexpected tree outcome: {:?}", other))),
        },
    };
    output::info(rendered.trim_end());
    Ok(())
}

#[instrument]
fn _get(source: &TreeLocation) -> CliResult<()> {
    let mut forest = Forest::new();
    let file = DirGroup::open(&source.container)?;
    let root = open_tree(&mut forest, &file, source.tree.as_deref())?;
    let node = resolve(&mut forest, root, &source.path)?;

    output::header(&display_path(&forest, node)?);
    output::field("name", forest.name(node)?);
    output::field("class", &forest.class(node)?);
    output::field("root", forest.name(root)?);
    let children: Vec<&str> = forest.children(node)?.keys().collect();
    output::field("children", &children.join(", "));
    for (key, bundle) in forest.metadata(node)? {
        output::field("metadata", key);
        for (k, v) in bundle.borrow().entries() {
            output::detail(&format!("  {} = {}", k, v));
        }
    }
    Ok(())
}

#[instrument]
fn _add(parent: &TreeLocation, name: &str) -> CliResult<()> {
    let mut forest = Forest::new();
    let container = Container::load(&mut forest, &parent.container)?;
    let root = container.tree(&forest, parent.tree.as_deref())?;
    let target = resolve(&mut forest, root, &parent.path)?;

    if forest.children(target)?.contains_key(name) {
        return Err(CliError::InvalidArgs(format!(
            "'{}' already has a child named '{}'",
            display_path(&forest, target)?,
            name
        )));
    }
    let node = forest.new_node(name);
    forest.tree(target, TreeOp::Add(node))?;
    container.save(&mut forest)?;
    output::action("added", &display_path(&forest, node)?);
    Ok(())
}

#[instrument]
fn _cut(source: &TreeLocation, out: &Path, mode: MergeMode) -> CliResult<()> {
    let mut forest = Forest::new();
    let container = Container::load(&mut forest, &source.container)?;
    let root = container.tree(&forest, source.tree.as_deref())?;
    let node = resolve(&mut forest, root, &source.path)?;

    let mut target = if same_container(out, &source.container) {
        None
    } else {
        Some(Container::load_or_new(&mut forest, out)?)
    };
    let name = forest.name(node)?.to_string();
    target.as_ref().unwrap_or(&container).ensure_tree_name_free(&forest, &name)?;

    let new_root = match forest.tree(node, TreeOp::Cut(mode))? {
        TreeOutcome::NewRoot(id) => id,
        other => return Err(CliError::Usage(format!("unexpected tree outcome: {:?}", other))),
    };

    match target.as_mut() {
        Some(target) => {
            target.roots.push(new_root);
            target.save(&mut forest)?;
            container.save(&mut forest)?;
        }
        None => {
            let mut container = container;
            container.roots.push(new_root);
            container.save(&mut forest)?;
        }
    }
    output::action(
        "cut",
        &format!(
            "'{}' is now the root of its own tree in {} (metadata: {})",
            forest.name(new_root)?,
            out.display(),
            mode
        ),
    );
    Ok(())
}

#[instrument]
fn _graft(source: &TreeLocation, target: &TreeLocation, mode: MergeMode) -> CliResult<()> {
    let mut forest = Forest::new();
    let src = Container::load(&mut forest, &source.container)?;
    let src_root = src.tree(&forest, source.tree.as_deref())?;
    let node = resolve(&mut forest, src_root, &source.path)?;

    let dst = if same_container(&source.container, &target.container) {
        None
    } else {
        Some(Container::load(&mut forest, &target.container)?)
    };
    let dst_root = dst.as_ref().unwrap_or(&src).tree(&forest, target.tree.as_deref())?;
    let onto = resolve(&mut forest, dst_root, &target.path)?;

    let name = forest.name(node)?.to_string();
    if forest.children(onto)?.contains_key(&name) && forest.parent(node)? != Some(onto) {
        return Err(CliError::InvalidArgs(format!(
            "'{}' already has a child named '{}'",
            display_path(&forest, onto)?,
            name
        )));
    }

    forest.tree(node, TreeOp::Graft { target: onto, mode })?;

    // target first: a failed source save then leaves the branch in both
    if let Some(dst) = &dst {
        dst.save(&mut forest)?;
    }
    src.save(&mut forest)?;
    output::action(
        "grafted",
        &format!(
            "{} into {} (metadata: {})",
            display_path(&forest, node)?,
            target.container.display(),
            mode
        ),
    );
    Ok(())
}

fn _config(command: &ConfigCommands, settings: &Settings) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(settings.to_toml()?.trim_end()),
        ConfigCommands::Template => output::info(Settings::template().trim_end()),
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::info(&path.display()),
            None => {
                return Err(CliError::Usage(
                    "no home directory; global config location unknown".to_string(),
                ))
            }
        },
    }
    Ok(())
}
