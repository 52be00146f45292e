use crate::graph::CompiledGraph;
use crate::{END, GraphState, START};

impl<S: GraphState> CompiledGraph<S> {
    /// Renders the graph as a [Mermaid](https://mermaid.js.org) flowchart.
    ///
    /// Edges out of a node with several routes are drawn dotted, since
    /// the node decides at runtime which one is taken.
    pub fn draw_mermaid(&self) -> String {
        let mut out = String::from("graph TD;\n");
        out.push_str(&format!("\t{START}([<p>{START}</p>]):::first\n"));
        for name in self.node_names() {
            out.push_str(&format!("\t{name}({name})\n"));
        }
        out.push_str(&format!("\t{END}([<p>{END}</p>]):::last\n"));

        for (from, to) in self.edge_list() {
            let arrow = if self.out_degree(from) > 1 { "-.->" } else { "-->" };
            out.push_str(&format!("\t{from} {arrow} {to};\n"));
        }

        out.push_str("\tclassDef default fill:#f2f0ff,line-height:1.2\n");
        out.push_str("\tclassDef first fill-opacity:0\n");
        out.push_str("\tclassDef last fill:#bfb6fc\n");
        out
    }
}
