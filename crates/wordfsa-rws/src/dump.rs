//! Human-readable dump of a compiled rewriting system.

use std::fmt::Write as _;

use wordfsa_core::{Colors, Step, width_for_count};

use crate::system::{RewritingSystem, StateId};

impl RewritingSystem {
    /// Dump rules and the transition table.
    ///
    /// ```text
    /// [system]
    /// generators 2, states 2, rules 1, confluent
    ///
    /// [rules]
    /// R0 aa → ε
    ///
    /// [states]
    /// S0 a→S1 b→S0
    /// S1 a→R0 b→S0
    /// ```
    pub fn dump(&self, colors: Colors) -> String {
        let c = &colors;
        let alphabet = &self.alphabet;
        let mut out = String::new();

        let _ = writeln!(out, "{}[system]{}", c.blue, c.reset);
        let _ = writeln!(
            out,
            "generators {}, states {}, rules {}, {}",
            alphabet.len(),
            self.state_count(),
            self.rule_count(),
            if self.is_confluent { "confluent" } else { "not confluent" }
        );

        let rw = width_for_count(self.rule_count());
        let _ = writeln!(out, "\n{}[rules]{}", c.blue, c.reset);
        for (i, (lhs, rhs)) in self.rules().enumerate() {
            let _ = writeln!(
                out,
                "R{i:0rw$} {}{}{} → {}{}{}",
                c.green,
                alphabet.display_word(lhs),
                c.reset,
                c.green,
                alphabet.display_word(rhs),
                c.reset
            );
        }

        let sw = width_for_count(self.state_count());
        let _ = writeln!(out, "\n{}[states]{}", c.blue, c.reset);
        for state in 0..self.state_count() as StateId {
            let _ = write!(out, "S{state:0sw$}");
            for g in alphabet.generators() {
                let target = match self.transition(state, g) {
                    Step::State(s) => format!("S{s:0sw$}"),
                    Step::Rule(r) => format!("{}R{r:0rw$}{}", c.dim, c.reset),
                };
                let _ = write!(out, " {}→{target}", alphabet.name(g));
            }
            out.push('\n');
        }

        out
    }
}
