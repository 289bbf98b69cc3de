//! th2 converter: MCP server and CLI that migrate th2 schema resources between schema versions.

mod config;
mod error;
mod model;
mod store;
mod tools;
mod types;

use clap::{Parser, Subcommand};
use config::{ConverterConfig, DEFAULT_CONFIG_PATH};
use rmcp::{
    handler::server::ServerHandler,
    model::{CallToolResult, Content},
    tool, tool_handler, tool_router,
    transport::stdio,
    ServiceExt,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use store::DirectoryStore;
use tracing_subscriber::EnvFilter;
use types::SchemaVersion;

#[derive(Debug, Parser)]
#[command(name = "th2-converter", version, about)]
struct Cli {
    /// Converter configuration file
    #[arg(long, env = "CONVERTER_CONFIG", default_value = DEFAULT_CONFIG_PATH, global = true)]
    config: PathBuf,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the MCP server on stdio (default)
    Serve,
    /// Convert a schema of the configured repository into `<schema><convertedSuffix>`
    Local {
        schema: String,
        current_version: String,
        target_version: String,
        /// Print the converted resources instead of writing them
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct ConvertResourcesParams {
    /// th2 resources as multi-document YAML (boxes, core boxes and links)
    resources: String,
    /// Version the resources are at: v1, v2 or v2-2
    current_version: String,
    /// Version to convert to: v2 or v2-2
    target_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct ConvertSchemaParams {
    /// Schema directory name under the configured repository root
    schema: String,
    /// Version the schema is at: v1, v2 or v2-2
    current_version: String,
    /// Version to convert to: v2 or v2-2
    target_version: String,
}

fn parse_versions(current: &str, target: &str) -> Result<(SchemaVersion, SchemaVersion), String> {
    let current = current.parse().map_err(|e: error::ConversionError| e.to_string())?;
    let target = target.parse().map_err(|e: error::ConversionError| e.to_string())?;
    Ok((current, target))
}

fn preview_local_conversion(
    config: &ConverterConfig,
    schema: &str,
    current: &str,
    target: &str,
) -> Result<String, String> {
    let (current, target) = parse_versions(current, target)?;
    let store = DirectoryStore::new(config.repository.root.clone());
    let result = tools::schema::convert_scope(&store, schema, current, target).map_err(|e| e.to_string())?;
    tools::request::render_result(&result, current, target)
}

fn run_local_conversion(
    config: &ConverterConfig,
    schema: &str,
    current: &str,
    target: &str,
) -> Result<tools::schema::LocalConversion, String> {
    let (current, target) = parse_versions(current, target)?;
    let store = DirectoryStore::new(config.repository.root.clone());
    tools::schema::convert_local_schema(
        &store,
        schema,
        &config.repository.converted_suffix,
        current,
        target,
    )
    .map_err(|e| e.to_string())
}

#[derive(Clone)]
struct ConverterMcpService {
    tool_router: rmcp::handler::server::tool::ToolRouter<Self>,
    config: Option<Arc<ConverterConfig>>,
}

#[tool_router]
impl ConverterMcpService {
    fn new(config: Option<ConverterConfig>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            config: config.map(Arc::new),
        }
    }

    #[tool(description = "Convert th2 resources (multi-document YAML) from one schema version to another; links are folded into pins")]
    async fn convert_resources(
        &self,
        params: rmcp::handler::server::wrapper::Parameters<ConvertResourcesParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let p = params.0;
        match tools::request::convert_from_request(&p.resources, &p.current_version, &p.target_version) {
            Ok(out) => Ok(CallToolResult::success(vec![Content::text(out)])),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(e)])),
        }
    }

    #[tool(description = "Convert a whole schema of the configured repository and save it next to the original")]
    async fn convert_schema(
        &self,
        params: rmcp::handler::server::wrapper::Parameters<ConvertSchemaParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let p = params.0;
        let Some(config) = self.config.as_deref() else {
            return Ok(CallToolResult::error(vec![Content::text(
                "Repository is not configured; set CONVERTER_CONFIG or --config",
            )]));
        };
        let outcome = run_local_conversion(config, &p.schema, &p.current_version, &p.target_version)
            .and_then(|o| {
                let failed = o.summary.has_errors();
                serde_json::to_string_pretty(&o)
                    .map(|text| (failed, text))
                    .map_err(|e| e.to_string())
            });
        match outcome {
            Ok((false, out)) => Ok(CallToolResult::success(vec![Content::text(out)])),
            Ok((true, out)) => Ok(CallToolResult::error(vec![Content::text(out)])),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(e)])),
        }
    }

    #[tool(description = "List th2 schema versions, their apiVersion strings and what each conversion step changes")]
    async fn list_schema_versions(&self) -> Result<CallToolResult, rmcp::ErrorData> {
        let out = tools::reference::list_schema_versions_json();
        Ok(CallToolResult::success(vec![Content::text(out)]))
    }
}

#[tool_handler]
impl ServerHandler for ConverterMcpService {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo::new(
            rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
        )
        .with_instructions(
            "MCP for th2 schemas: convert boxes and links between schema versions v1, v2 and v2-2.",
        )
    }
}

fn init_tracing() {
    // stdout carries the MCP transport.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let config = match ConverterConfig::load(&cli.config) {
                Ok(config) => Some(config),
                Err(e) => {
                    tracing::warn!(error = %e, "no repository configuration, convert_schema is disabled");
                    None
                }
            };
            let service = ConverterMcpService::new(config);
            let transport = stdio();
            let server = service.serve(transport).await?;
            server.waiting().await?;
        }
        Command::Local {
            schema,
            current_version,
            target_version,
            dry_run,
        } => {
            let config = ConverterConfig::load(&cli.config)?;
            if dry_run {
                let out = preview_local_conversion(&config, &schema, &current_version, &target_version)?;
                println!("{}", out);
                return Ok(());
            }
            let outcome = run_local_conversion(&config, &schema, &current_version, &target_version)?;
            if outcome.summary.has_errors() {
                return Err(format!(
                    "conversion of schema '{}' failed with {} error(s)",
                    schema,
                    outcome.summary.error_messages.len()
                )
                .into());
            }
        }
    }
    Ok(())
}
