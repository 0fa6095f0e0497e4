/// Integration tests running the store and the MCP server together
mod concurrency;
mod mcp_workflow;
