use std::fmt::{self, Display, Write};

use crate::theap::Heap;

/// Options for `write_dot` / `to_dot`
#[derive(Clone, Debug)]
pub struct DotOptions {
    /// Emitted as `digraph "<name>" {` when set, otherwise the graph is anonymous
    pub graph_name: Option<String>,
    /// If true, every missing child gets an invisible point node and a zero width edge,
    /// which keeps Graphviz from centering lone left/right children under their parent.
    /// If false, missing children are simply left out.
    pub null_leaves: bool
}

impl DotOptions {
    /// Anonymous graph with invisible placeholders for missing children
    pub const DEFAULT: Self = Self{graph_name: None, null_leaves: true};
}

impl Default for DotOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn write_child(out: &mut impl Write, id: u64, child: Option<u64>, null_prefix: &str, opts: &DotOptions) -> fmt::Result {
    match child {
        Some(c) => writeln!(out, "n{} -> n{};", id, c),
        None if opts.null_leaves => {
            writeln!(out, "{}{} [shape = \"point\" width = \"0\"];", null_prefix, id)?;
            writeln!(out, "n{} -> {}{} [arrowsize = \"0\", penwidth = \"0\"];", id, null_prefix, id)
        },
        None => Ok(())
    }
}

/// Write the tree of `heap` as a Graphviz digraph.
/// Nodes are named `n<id>` and labeled with their value, and are emitted in preorder.
/// Missing left/right children become `null<id>`/`nullr<id>` (see `DotOptions::null_leaves`).
/// Render with eg `dot -Tpng heap.dot > heap.png`
pub fn write_dot<T: Display>(heap: &Heap<T>, out: &mut impl Write, opts: &DotOptions) -> fmt::Result {
    match &opts.graph_name {
        Some(name) => writeln!(out, "digraph \"{}\" {{", escape(name))?,
        None => writeln!(out, "digraph {{")?
    }
    for node in heap.walk() {
        writeln!(out, "n{};", node.id)?;
        // not to_string(), which panics if the value's Display fails
        let mut label = String::new();
        write!(label, "{}", node.value)?;
        writeln!(out, "n{} [label = \"{}\" ];", node.id, escape(&label))?;
        write_child(out, node.id, node.left, "null", opts)?;
        write_child(out, node.id, node.right, "nullr", opts)?;
    }
    writeln!(out, "}}")
}

/// Same as `write_dot` but collects the graph into a String.
/// The String itself never fails to grow, so an error here means some value's `Display` impl failed
pub fn to_dot<T: Display>(heap: &Heap<T>, opts: &DotOptions) -> Result<String, fmt::Error> {
    let mut res = String::new();
    write_dot(heap, &mut res, opts)?;
    Ok(res)
}

#[cfg(test)]
mod tests {
    use crate::theap::Heap;

    use super::*;

    #[test]
    fn empty_graph() {
        let heap = Heap::<i32>::new();
        assert_eq!(to_dot(&heap, &DotOptions::default()), Ok("digraph {\n}\n".into()));
    }

    #[test]
    fn three_nodes() {
        let mut heap = Heap::new();
        for x in [3, 7, 5] {
            heap.insert(x)
        }
        // 7 bubbled up past 3, so node 1 holds 7 and node 2 holds 3
        let expected = "\
digraph {
n1;
n1 [label = \"7\" ];
n1 -> n2;
n1 -> n3;
n2;
n2 [label = \"3\" ];
null2 [shape = \"point\" width = \"0\"];
n2 -> null2 [arrowsize = \"0\", penwidth = \"0\"];
nullr2 [shape = \"point\" width = \"0\"];
n2 -> nullr2 [arrowsize = \"0\", penwidth = \"0\"];
n3;
n3 [label = \"5\" ];
null3 [shape = \"point\" width = \"0\"];
n3 -> null3 [arrowsize = \"0\", penwidth = \"0\"];
nullr3 [shape = \"point\" width = \"0\"];
n3 -> nullr3 [arrowsize = \"0\", penwidth = \"0\"];
}
";
        assert_eq!(to_dot(&heap, &DotOptions::default()), Ok(expected.into()));
    }

    #[test]
    fn named_without_null_leaves() {
        let mut heap = Heap::new();
        heap.insert("say \"hi\"");
        heap.insert("a");
        let opts = DotOptions{graph_name: Some("my heap".into()), null_leaves: false};
        let expected = "\
digraph \"my heap\" {
n1;
n1 [label = \"say \\\"hi\\\"\" ];
n1 -> n2;
n2;
n2 [label = \"a\" ];
}
";
        assert_eq!(to_dot(&heap, &opts), Ok(expected.into()));
    }

    const SCENARIO: [i32; 7] = [52, 10, 4, 22, 35, 46, 17];

    fn scenario_heap() -> Heap<i32> {
        let mut heap = Heap::new();
        for x in SCENARIO {
            heap.insert(x)
        }
        heap
    }

    #[test]
    fn scenario_dot() {
        // slots hold 52 35 46 10 22 4 17, node ids 1..7 in slot order
        let expected = "\
digraph {
n1;
n1 [label = \"52\" ];
n1 -> n2;
n1 -> n3;
n2;
n2 [label = \"35\" ];
n2 -> n4;
n2 -> n5;
n4;
n4 [label = \"10\" ];
null4 [shape = \"point\" width = \"0\"];
n4 -> null4 [arrowsize = \"0\", penwidth = \"0\"];
nullr4 [shape = \"point\" width = \"0\"];
n4 -> nullr4 [arrowsize = \"0\", penwidth = \"0\"];
n5;
n5 [label = \"22\" ];
null5 [shape = \"point\" width = \"0\"];
n5 -> null5 [arrowsize = \"0\", penwidth = \"0\"];
nullr5 [shape = \"point\" width = \"0\"];
n5 -> nullr5 [arrowsize = \"0\", penwidth = \"0\"];
n3;
n3 [label = \"46\" ];
n3 -> n6;
n3 -> n7;
n6;
n6 [label = \"4\" ];
null6 [shape = \"point\" width = \"0\"];
n6 -> null6 [arrowsize = \"0\", penwidth = \"0\"];
nullr6 [shape = \"point\" width = \"0\"];
n6 -> nullr6 [arrowsize = \"0\", penwidth = \"0\"];
n7;
n7 [label = \"17\" ];
null7 [shape = \"point\" width = \"0\"];
n7 -> null7 [arrowsize = \"0\", penwidth = \"0\"];
nullr7 [shape = \"point\" width = \"0\"];
n7 -> nullr7 [arrowsize = \"0\", penwidth = \"0\"];
}
";
        assert_eq!(to_dot(&scenario_heap(), &DotOptions::default()), Ok(expected.into()));
    }

    #[test]
    fn rebuilt_scenario_dot() {
        let mut heap = scenario_heap();
        while heap.remove().is_ok() {}
        for x in SCENARIO {
            heap.insert(x)
        }
        let dot = to_dot(&heap, &DotOptions::default()).unwrap();
        // same shape as the first build, but ids keep counting from 8
        assert!(dot.starts_with("digraph {\nn8;\nn8 [label = \"52\" ];\nn8 -> n9;\nn8 -> n10;\nn9;\nn9 [label = \"35\" ];\n"), "{}", dot);
        assert!(dot.contains("n14;\nn14 [label = \"17\" ];\n"), "{}", dot);
        let fresh = to_dot(&scenario_heap(), &DotOptions::default()).unwrap();
        assert_eq!(dot.lines().count(), fresh.lines().count());
        assert!(!dot.lines().any(|l|l == "n1;" || l == "n7;"), "{}", dot);
    }

    #[derive(PartialEq, Eq, PartialOrd, Ord)]
    struct Unprintable;

    impl Display for Unprintable {
        fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[test]
    fn display_error_is_reported() {
        let mut heap = Heap::new();
        heap.insert(Unprintable);
        assert_eq!(to_dot(&heap, &DotOptions::default()), Err(fmt::Error));
    }
}
