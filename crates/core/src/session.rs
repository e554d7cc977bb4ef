//! Session that ties root lookup, name extraction, command building and the
//! navigator together behind the four user-facing actions.

use crate::{
    command::{CommandBuilder, ProcessHandle},
    config::Config,
    error::{Error, Result},
    extract::{KeywordScanExtractor, NameExtractor},
    navigator::{OutputSink, ResultNavigator},
    project::{ManifestRootLocator, RootLocator},
    types::Invocation,
};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

/// The user-facing actions, by their stable command names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    RunCurrentFile,
    RunAllTests,
    RunAtPoint,
    RerunLast,
}

impl Action {
    pub const ALL: [Action; 4] = [
        Action::RunCurrentFile,
        Action::RunAllTests,
        Action::RunAtPoint,
        Action::RerunLast,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Action::RunCurrentFile => "run-current-file",
            Action::RunAllTests => "run-all-tests",
            Action::RunAtPoint => "run-at-point",
            Action::RerunLast => "rerun-last",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Action::ALL
            .into_iter()
            .find(|action| action.name() == s)
            .ok_or_else(|| Error::ConfigError(format!("unknown action '{s}'")))
    }
}

/// What an action is aimed at: the file being edited and, for
/// `run-at-point`, the cursor inside it.
#[derive(Debug, Clone, Default)]
pub struct Target {
    pub file: Option<PathBuf>,
    /// Buffer contents; read from `file` when absent.
    pub text: Option<String>,
    /// Byte offset of the cursor in the buffer.
    pub offset: Option<usize>,
}

impl Target {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            file: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn at(path: impl Into<PathBuf>, offset: usize) -> Self {
        Self {
            file: Some(path.into()),
            text: None,
            offset: Some(offset),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

pub struct Session {
    config: Config,
    default_dir: PathBuf,
    locator: Box<dyn RootLocator>,
    extractor: Box<dyn NameExtractor>,
    builder: CommandBuilder,
    navigator: ResultNavigator,
}

impl Session {
    /// `default_dir` is where commands run when no project root is found,
    /// usually the current working directory.
    pub fn new(
        config: Config,
        default_dir: impl Into<PathBuf>,
        sink: Arc<dyn OutputSink>,
    ) -> Result<Self> {
        config.validate()?;

        let mut navigator = ResultNavigator::new(sink);
        for pattern in &config.patterns {
            navigator.register_pattern(
                &pattern.tag,
                &pattern.regex,
                pattern.file_group,
                pattern.line_group,
                pattern.col_group,
            )?;
        }

        Ok(Self {
            locator: Box::new(ManifestRootLocator::new(&config.manifest, config.ascent)),
            extractor: Box::new(KeywordScanExtractor::new(&config.block_keyword)?),
            builder: CommandBuilder::new(config.escape_target),
            default_dir: default_dir.into(),
            navigator,
            config,
        })
    }

    pub fn with_locator(mut self, locator: Box<dyn RootLocator>) -> Self {
        self.locator = locator;
        self
    }

    pub fn with_extractor(mut self, extractor: Box<dyn NameExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn navigator(&self) -> &ResultNavigator {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut ResultNavigator {
        &mut self.navigator
    }

    /// Resolve `action` to the command it would run, without running it.
    pub fn plan(&self, action: Action, target: &Target) -> Result<Invocation> {
        debug!("Planning {} for {:?}", action, target.file);
        match action {
            Action::RunCurrentFile => {
                let file = self.backing_file(target)?;
                let root = self.locator.locate(&file, &self.default_dir);
                let command =
                    self.builder
                        .build(&self.config.command, &self.config.options, &path_arg(&file));
                Ok(Invocation::new(command, root))
            }
            Action::RunAllTests => {
                let start = match target.file.as_deref() {
                    Some(file) if !file.as_os_str().is_empty() => self.absolute(file),
                    _ => self.default_dir.clone(),
                };
                let root = self.locator.locate(&start, &self.default_dir);
                let command = self
                    .builder
                    .build(&self.config.command, &self.config.options, "");
                Ok(Invocation::new(command, root))
            }
            Action::RunAtPoint => {
                let file = self.backing_file(target)?;
                let text = match &target.text {
                    Some(text) => text.clone(),
                    None => std::fs::read_to_string(&file)?,
                };
                let offset = target.offset.unwrap_or(0);
                let name = self.extractor.extract_at(&text, offset).ok_or_else(|| {
                    Error::NoTestBlock {
                        keyword: self.extractor.keyword().to_string(),
                    }
                })?;
                info!("Filtering on '{}'", name);

                let root = self.locator.locate(&file, &self.default_dir);
                let command = self.builder.build_filtered(
                    &self.config.command,
                    &self.config.options,
                    &path_arg(&file),
                    &name,
                );
                Ok(Invocation::new(command, root))
            }
            Action::RerunLast => self
                .navigator
                .last_invocation()
                .cloned()
                .ok_or(Error::NoPriorCommand),
        }
    }

    /// Run `action`. The process starts in the background; the returned
    /// handle streams its output.
    pub fn dispatch(&mut self, action: Action, target: &Target) -> Result<ProcessHandle> {
        match action {
            Action::RerunLast => self.navigator.rerun(),
            _ => {
                let invocation = self.plan(action, target)?;
                self.navigator.run(invocation)
            }
        }
    }

    pub fn run_current_file(&mut self, file: &Path) -> Result<ProcessHandle> {
        self.dispatch(Action::RunCurrentFile, &Target::file(file))
    }

    pub fn run_all_tests(&mut self, file: Option<&Path>) -> Result<ProcessHandle> {
        let target = Target {
            file: file.map(Path::to_path_buf),
            ..Default::default()
        };
        self.dispatch(Action::RunAllTests, &target)
    }

    pub fn run_at_point(&mut self, target: &Target) -> Result<ProcessHandle> {
        self.dispatch(Action::RunAtPoint, target)
    }

    pub fn rerun_last(&mut self) -> Result<ProcessHandle> {
        self.dispatch(Action::RerunLast, &Target::default())
    }

    fn backing_file(&self, target: &Target) -> Result<PathBuf> {
        match target.file.as_deref() {
            Some(file) if !file.as_os_str().is_empty() => Ok(self.absolute(file)),
            _ => Err(Error::NoBackingFile),
        }
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.default_dir.join(path)
        }
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
