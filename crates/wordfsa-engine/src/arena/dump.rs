//! Human-readable dump of the live trie.

use std::fmt::Write as _;

use wordfsa_core::Colors;

use super::node::{NodeBody, Stage};
use super::{NodeArena, NodeId};

impl NodeArena {
    /// Dump the trie depth-first, children in generator order.
    ///
    /// ```text
    /// [arena]
    /// nodes 4, free 0, equations 1
    ///
    /// [trie]
    /// N0 ε
    ///   N1 a ◆S2
    ///     N3 aa → ε queued
    ///   N2 b
    /// ```
    pub fn dump(&self, colors: Colors) -> String {
        let c = &colors;
        let alphabet = self.alphabet();
        let mut out = String::new();

        let _ = writeln!(out, "{}[arena]{}", c.blue, c.reset);
        let _ = writeln!(
            out,
            "nodes {}, free {}, equations {}",
            self.live_count(),
            self.free_count(),
            self.equation_count()
        );
        let _ = writeln!(out, "\n{}[trie]{}", c.blue, c.reset);

        let mut stack = vec![(NodeId::ROOT, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let word = alphabet.display_word(&self.word(id));
            let _ = write!(out, "{:indent$}{id} {}{word}{}", "", c.green, c.reset, indent = depth * 2);
            match &self.node(id).body {
                NodeBody::Irreducible(irr) => {
                    if let Some(state) = irr.difference {
                        let _ = write!(out, " {}◆{state}{}", c.dim, c.reset);
                    }
                    for (_, child) in irr.table.children().into_iter().rev() {
                        stack.push((child, depth + 1));
                    }
                }
                NodeBody::Equation(eq) => {
                    let rhs = alphabet.display_word(&self.word(eq.rhs));
                    let stage = match eq.stage {
                        Stage::New => "new",
                        Stage::Queued => "queued",
                        Stage::Adopted => "adopted",
                    };
                    let _ = write!(out, " → {}{rhs}{} {}{stage}", c.green, c.reset, c.dim);
                    if !eq.primary {
                        out.push_str(" secondary");
                    }
                    out.push_str(c.reset);
                }
                NodeBody::Removed | NodeBody::Free { .. } => {}
            }
            out.push('\n');
        }

        out
    }
}
