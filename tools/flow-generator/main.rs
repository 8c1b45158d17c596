use clap::Parser;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::PathBuf;
use ura::flow::{
    AiPayload, Edge, ExtensionPayload, Flow, FlowDraft, FlowGraph, GroupPayload, MenuOption,
    MenuPayload, Node, NodePayload, RingStrategy, TenantId,
};

/// A CLI tool to generate random call-flow documents for testing the console
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory to write the generated flow documents to
    #[arg(short, long, default_value = "generated_flows")]
    output: PathBuf,

    /// Number of flows to generate
    #[arg(short, long, default_value_t = 10)]
    count: usize,

    /// Maximum menu nesting depth
    #[arg(long, default_value_t = 3)]
    depth: usize,

    /// Maximum number of options per menu (at most 10)
    #[arg(long, default_value_t = 4)]
    width: usize,

    /// Tenant the flows belong to
    #[arg(long, default_value = "tenant-demo")]
    tenant: String,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

const KEYS: [&str; 10] = ["1", "2", "3", "4", "5", "6", "7", "8", "9", "0"];
const DEPARTMENTS: [&str; 6] = ["Support", "Sales", "Billing", "Returns", "Reception", "Operator"];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    if cli.width == 0 || cli.width > KEYS.len() {
        eprintln!("Error: --width must be between 1 and {}", KEYS.len());
        std::process::exit(1);
    }

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    fs::create_dir_all(&cli.output)?;
    println!(
        "Generating {} flow(s) (depth up to {}, up to {} options per menu)...",
        cli.count, cli.depth, cli.width
    );

    for i in 0..cli.count {
        let mut generator = FlowGenerator::new(&mut rng, cli.width);
        let draft = generator.generate(&format!("Generated flow {}", i + 1), cli.depth)?;
        let flow: Flow = draft.into_flow(format!("flow-gen-{}", i + 1), TenantId::new(&cli.tenant));
        let path = cli.output.join(format!("flow-{:03}.json", i + 1));
        fs::write(&path, flow.to_json_pretty())?;
        println!(
            "-> '{}': {} nodes, {} edges",
            path.display(),
            flow.graph.node_count(),
            flow.graph.edge_count()
        );
    }

    println!("Successfully generated flows in '{}'", cli.output.display());
    Ok(())
}

struct FlowGenerator<'a> {
    rng: &'a mut StdRng,
    width: usize,
    graph: FlowGraph,
    next_id: usize,
}

impl<'a> FlowGenerator<'a> {
    fn new(rng: &'a mut StdRng, width: usize) -> Self {
        Self {
            rng,
            width,
            graph: FlowGraph::new(),
            next_id: 0,
        }
    }

    fn generate(&mut self, name: &str, depth: usize) -> Result<FlowDraft, ura::error::GraphError> {
        let entry = self.menu(depth)?;
        let graph = std::mem::take(&mut self.graph);
        Ok(FlowDraft::from_graph(name, entry, graph))
    }

    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    /// Adds a menu and its subtree, returning the menu's id.
    fn menu(&mut self, depth: usize) -> Result<String, ura::error::GraphError> {
        let id = self.id("menu");
        let option_count = self.rng.random_range(1..=self.width);
        let options: Vec<MenuOption> = KEYS[..option_count]
            .iter()
            .map(|key| MenuOption {
                key: key.to_string(),
                label: DEPARTMENTS.choose(&mut *self.rng).unwrap_or(&"Option").to_string(),
            })
            .collect();
        let prompt_text = options
            .iter()
            .map(|o| format!("For {} press {}", o.label, o.key))
            .collect::<Vec<_>>()
            .join(". ");
        self.graph.add_node(Node::new(
            id.clone(),
            NodePayload::Menu(MenuPayload {
                prompt_text,
                options: options.clone(),
            }),
        ))?;

        for option in &options {
            // Some keys are left unwired to exercise dead-end warnings.
            if self.rng.random_bool(0.1) {
                continue;
            }
            let target = if depth > 1 && self.rng.random_bool(0.3) {
                self.menu(depth - 1)?
            } else {
                self.terminal()?
            };
            let edge_id = self.id("edge");
            self.graph
                .add_edge(Edge::new(edge_id, id.clone(), Some(option.key.as_str()), target))?;
        }

        if self.rng.random_bool(0.5) {
            let target = self.terminal()?;
            let edge_id = self.id("edge");
            self.graph
                .add_edge(Edge::new(edge_id, id.clone(), Some("timeout"), target))?;
        }
        Ok(id)
    }

    fn terminal(&mut self) -> Result<String, ura::error::GraphError> {
        let department = DEPARTMENTS.choose(&mut *self.rng).unwrap_or(&"Operator").to_string();
        let (id, payload) = match self.rng.random_range(0..3) {
            0 => (
                self.id("ext"),
                NodePayload::Extension(ExtensionPayload {
                    extension_number: self.rng.random_range(1000..9999).to_string(),
                    display_name: department,
                }),
            ),
            1 => (
                self.id("group"),
                NodePayload::Group(GroupPayload {
                    group_id: format!("grp-{}", self.rng.random_range(1..100)),
                    display_name: department,
                    strategy: if self.rng.random_bool(0.5) {
                        RingStrategy::Simultaneous
                    } else {
                        RingStrategy::Sequential
                    },
                }),
            ),
            _ => (
                self.id("ai"),
                NodePayload::Ai(AiPayload {
                    project_id: format!("proj-{}", self.rng.random_range(1..20)),
                    agent_id: format!("{}-agent", department.to_lowercase()),
                    session_id: None,
                    webhook_url: None,
                }),
            ),
        };
        self.graph.add_node(Node::new(id.clone(), payload))?;
        Ok(id)
    }
}
