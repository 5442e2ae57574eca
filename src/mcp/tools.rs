//! MCP tool definitions and registry
//!
//! The tools mirror what a reading-list popup offers: start an extraction,
//! look at the list, preview it, export it as Markdown and clear it.

use crate::browser::{BrowserConfig, BrowserController, PageHandle, PageNavigator};
use crate::config::ExtractorConfig;
use crate::error::{Error, McpError, NavigationError, Result, StorageError};
use crate::extraction::{Extractor, PageSource, StaticPage};
use crate::mcp::types::{McpToolDefinition, ToolCallResult};
use crate::preview;
use crate::storage::{spawn_store_writer, ReadingList};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// How long a freshly opened timeline gets to render its first post
const FIRST_POST_TIMEOUT_MS: u64 = 10_000;

/// A registered MCP tool
pub trait McpTool: Send + Sync {
    /// Tool name
    fn name(&self) -> &str;
    /// Tool description
    fn description(&self) -> &str;
    /// Input schema as JSON
    fn input_schema(&self) -> Value;
    /// Get tool definition
    fn definition(&self) -> McpToolDefinition {
        McpToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// Tool registry holding the reading list and the shared browser
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn McpTool>>,
    store: Arc<RwLock<ReadingList>>,
    browser: Arc<RwLock<Option<BrowserController>>>,
    passes: Mutex<JoinSet<()>>,
    extractor: Arc<Extractor>,
    browser_config: BrowserConfig,
    attach_url: Option<String>,
    export_dir: PathBuf,
}

impl ToolRegistry {
    /// Create a registry over `store` with all built-in tools
    pub fn new(store: ReadingList) -> Self {
        let mut registry = Self {
            tools: HashMap::new(),
            store: Arc::new(RwLock::new(store)),
            browser: Arc::new(RwLock::new(None)),
            passes: Mutex::new(JoinSet::new()),
            extractor: Arc::new(Extractor::default()),
            browser_config: BrowserConfig::default(),
            attach_url: None,
            export_dir: PathBuf::from("."),
        };

        registry.register(Box::new(ExtractUrlsTool));
        registry.register(Box::new(GetUrlsTool));
        registry.register(Box::new(PreviewUrlsTool));
        registry.register(Box::new(ExportUrlsTool));
        registry.register(Box::new(ClearUrlsTool));

        registry
    }

    /// Use a custom extractor configuration
    pub fn with_extractor_config(mut self, config: ExtractorConfig) -> Self {
        self.extractor = Arc::new(Extractor::new(config));
        self
    }

    /// Use a custom browser launch configuration
    pub fn with_browser_config(mut self, config: BrowserConfig) -> Self {
        self.browser_config = config;
        self
    }

    /// Attach to a running browser instead of launching one
    pub fn with_attach_url(mut self, url: impl Into<String>) -> Self {
        self.attach_url = Some(url.into());
        self
    }

    /// Directory used by `export_urls` when no `outDir` is given
    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    /// Register a tool
    pub fn register(&mut self, tool: Box<dyn McpTool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Get all tool definitions, sorted by name
    pub fn definitions(&self) -> Vec<McpToolDefinition> {
        let mut defs: Vec<_> = self.tools.values().map(|t| t.definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Shared handle to the reading list
    pub fn store(&self) -> Arc<RwLock<ReadingList>> {
        self.store.clone()
    }

    /// Execute a tool by name
    #[instrument(skip(self, args))]
    pub async fn execute(&self, name: &str, args: Value) -> ToolCallResult {
        info!("Executing tool: {}", name);

        match name {
            "extract_urls" => self.execute_extract(args).await,
            "get_urls" => self.execute_get().await,
            "preview_urls" => self.execute_preview().await,
            "export_urls" => self.execute_export(args).await,
            "clear_urls" => self.execute_clear().await,
            _ => ToolCallResult::error(McpError::ToolNotFound(name.to_string()).to_string()),
        }
    }

    /// Number of acknowledged passes that have not finished yet
    pub async fn pending_passes(&self) -> usize {
        let mut passes = self.passes.lock().await;
        while passes.try_join_next().is_some() {}
        passes.len()
    }

    /// Let running passes finish, then close the browser if one was started
    pub async fn shutdown(&self) -> Result<()> {
        let mut passes = self.passes.lock().await;
        if !passes.is_empty() {
            info!("Waiting for {} extraction passes to finish", passes.len());
        }
        while let Some(joined) = passes.join_next().await {
            if let Err(e) = joined {
                warn!("Extraction pass failed: {}", e);
            }
        }
        drop(passes);

        if let Some(browser) = self.browser.write().await.take() {
            browser.close().await?;
        }
        Ok(())
    }

    async fn execute_extract(&self, args: Value) -> ToolCallResult {
        let wait = args.get("wait").and_then(|v| v.as_bool()).unwrap_or(false);

        let page: Box<dyn PageSource> = if let Some(html) = args.get("html").and_then(|v| v.as_str()) {
            let base = args
                .get("baseUrl")
                .and_then(|v| v.as_str())
                .and_then(|u| Url::parse(u).ok());
            Box::new(StaticPage::new(html, base))
        } else {
            let url = args.get("url").and_then(|v| v.as_str());
            match self.open_timeline(url).await {
                Ok(page) => Box::new(page),
                Err(Error::Navigation(e)) => {
                    warn!("Refusing extraction: {}", e);
                    return ToolCallResult::error(e.to_string());
                }
                Err(e) => {
                    error!("Could not open timeline: {}", e);
                    return ToolCallResult::error(e.to_string());
                }
            }
        };

        let (tx, rx) = mpsc::unbounded_channel();
        let writer = spawn_store_writer(self.store.clone(), rx);
        let extractor = self.extractor.clone();

        let pass = async move {
            let report = extractor.run(page.as_ref(), &tx).await;
            drop(tx);
            let saved = writer.await.unwrap_or_else(|e| {
                warn!("Store writer failed: {}", e);
                0
            });
            (report, saved)
        };

        if !wait {
            let mut passes = self.passes.lock().await;
            while passes.try_join_next().is_some() {}
            passes.spawn(async move {
                let (report, saved) = pass.await;
                debug!("Pass saved {} of {} links", saved, report.records_emitted);
            });
            return ToolCallResult::json(&json!({ "success": true }));
        }

        match tokio::spawn(pass).await {
            Ok((report, saved)) => ToolCallResult::json(&json!({
                "success": true,
                "report": report,
                "saved": saved,
            })),
            Err(e) => ToolCallResult::error(format!("Extraction task failed: {}", e)),
        }
    }

    /// Resolve the page to read: a given URL, or an open platform tab
    async fn open_timeline(&self, url: Option<&str>) -> Result<PageHandle> {
        let platform = &self.extractor.config().platform;
        if let Some(url) = url {
            if !platform.is_platform_page(url) {
                return Err(NavigationError::NotPlatformPage {
                    platform: platform.display_name.clone(),
                    url: url.to_string(),
                }
                .into());
            }
        }

        self.ensure_browser().await?;
        let guard = self.browser.read().await;
        let Some(browser) = guard.as_ref() else {
            return Err(Error::generic("browser unavailable"));
        };

        match url {
            Some(url) => {
                let page = browser.navigate(url).await?;
                if let Some(first) = platform.post_selectors.first() {
                    if let Err(e) =
                        PageNavigator::wait_for_selector(&page, first, FIRST_POST_TIMEOUT_MS).await
                    {
                        warn!("No post rendered yet: {}", e);
                    }
                }
                Ok(page)
            }
            None => browser.find_platform_tab(platform).await?.ok_or_else(|| {
                NavigationError::NotPlatformPage {
                    platform: platform.display_name.clone(),
                    url: "no open tab".to_string(),
                }
                .into()
            }),
        }
    }

    async fn ensure_browser(&self) -> Result<()> {
        let mut guard = self.browser.write().await;
        if guard.is_none() {
            let browser = match &self.attach_url {
                Some(url) => BrowserController::attach(url).await?,
                None => BrowserController::with_config(self.browser_config.clone()).await?,
            };
            *guard = Some(browser);
        }
        Ok(())
    }

    async fn execute_get(&self) -> ToolCallResult {
        let list = self.store.read().await;
        ToolCallResult::json(&json!({ "urls": list.list_all() }))
    }

    async fn execute_preview(&self) -> ToolCallResult {
        let list = self.store.read().await;
        ToolCallResult::text(preview::render(list.list_all()))
    }

    async fn execute_export(&self, args: Value) -> ToolCallResult {
        let dir = args
            .get("outDir")
            .and_then(|v| v.as_str())
            .map(PathBuf::from)
            .unwrap_or_else(|| self.export_dir.clone());

        let doc = match self.store.read().await.export() {
            Ok(doc) => doc,
            Err(StorageError::Empty) => return ToolCallResult::error(StorageError::Empty.to_string()),
            Err(e) => return ToolCallResult::error(format!("Export failed: {}", e)),
        };

        match doc.write_to(&dir) {
            Ok(path) => {
                info!("Exported {} URLs to {}", doc.count, path.display());
                ToolCallResult::json(&json!({
                    "success": true,
                    "path": path.display().to_string(),
                    "count": doc.count,
                }))
            }
            Err(e) => ToolCallResult::error(format!("Export failed: {}", e)),
        }
    }

    async fn execute_clear(&self) -> ToolCallResult {
        match self.store.write().await.clear() {
            Ok(()) => ToolCallResult::json(&json!({ "success": true })),
            Err(e) => ToolCallResult::error(format!("Clear failed: {}", e)),
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new(ReadingList::in_memory())
    }
}

// ============================================================================
// Tool Definitions
// ============================================================================

/// Start an extraction pass
struct ExtractUrlsTool;

impl McpTool for ExtractUrlsTool {
    fn name(&self) -> &str {
        "extract_urls"
    }

    fn description(&self) -> &str {
        "Collect outbound links from an X (Twitter) timeline into the reading list"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "Timeline URL on x.com or twitter.com. Omit to use an open tab."
                },
                "html": {
                    "type": "string",
                    "description": "Saved timeline HTML to read instead of a live page"
                },
                "baseUrl": {
                    "type": "string",
                    "description": "URL relative links in `html` resolve against"
                },
                "wait": {
                    "type": "boolean",
                    "description": "Wait for the pass to finish and return its report",
                    "default": false
                }
            }
        })
    }
}

/// List saved records
struct GetUrlsTool;

impl McpTool for GetUrlsTool {
    fn name(&self) -> &str {
        "get_urls"
    }

    fn description(&self) -> &str {
        "Return every saved link in the order it was found"
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }
}

/// Short text preview
struct PreviewUrlsTool;

impl McpTool for PreviewUrlsTool {
    fn name(&self) -> &str {
        "preview_urls"
    }

    fn description(&self) -> &str {
        "Show a count and the first few saved links"
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }
}

/// Markdown export
struct ExportUrlsTool;

impl McpTool for ExportUrlsTool {
    fn name(&self) -> &str {
        "export_urls"
    }

    fn description(&self) -> &str {
        "Write the reading list to a dated Markdown file"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "outDir": {
                    "type": "string",
                    "description": "Directory for the Markdown file"
                }
            }
        })
    }
}

/// Empty the list
struct ClearUrlsTool;

impl McpTool for ClearUrlsTool {
    fn name(&self) -> &str {
        "clear_urls"
    }

    fn description(&self) -> &str {
        "Remove every saved link"
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }
}

/// List of all available tools (for documentation)
pub const AVAILABLE_TOOLS: &[&str] = &[
    "extract_urls",
    "get_urls",
    "preview_urls",
    "export_urls",
    "clear_urls",
];
