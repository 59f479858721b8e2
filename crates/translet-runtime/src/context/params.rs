//! Template parameter frames.
//!
//! All bindings live in one flat stack. Pushing a frame remembers the previous frame
//! base; the active frame is everything from the current base upwards. Lookups only ever
//! scan the active frame, so a callee never sees its caller's bindings.
use compact_str::CompactString;
use tracing::trace;

use crate::value::Value;

#[derive(Debug, Clone)]
pub struct Parameter<N> {
    pub name: CompactString,
    pub value: Value<N>,
    /// Bound from the `xsl:param` default rather than an explicit `xsl:with-param`.
    pub is_default: bool,
}

#[derive(Debug, Clone)]
pub struct ParameterStack<N> {
    params: Vec<Parameter<N>>,
    saved_bases: Vec<usize>,
    base: usize,
}

impl<N> Default for ParameterStack<N> {
    fn default() -> Self {
        Self { params: Vec::new(), saved_bases: Vec::new(), base: 0 }
    }
}

impl<N> ParameterStack<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new, empty active frame.
    pub fn push_frame(&mut self) {
        self.saved_bases.push(self.base);
        self.base = self.params.len();
        trace!(depth = self.depth(), "push parameter frame");
    }

    /// Drop the active frame and restore its parent. The root frame is never popped.
    pub fn pop_frame(&mut self) {
        if let Some(saved) = self.saved_bases.pop() {
            self.params.truncate(self.base);
            self.base = saved;
            trace!(depth = self.depth(), "pop parameter frame");
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        (self.base..self.params.len()).rev().find(|&i| self.params[i].name.as_str() == name)
    }

    /// Bind `name` in the active frame and return the value that is now in effect.
    ///
    /// An existing binding is replaced when it came from a default or when the new value is
    /// explicit; an explicit value is never replaced by a default.
    pub fn bind(&mut self, name: &str, value: Value<N>, is_default: bool) -> &Value<N> {
        let index = match self.position(name) {
            Some(i) => {
                let p = &mut self.params[i];
                if p.is_default || !is_default {
                    trace!(name, is_default, "rebind parameter");
                    p.value = value;
                    p.is_default = is_default;
                }
                i
            }
            None => {
                trace!(name, is_default, "bind parameter");
                self.params.push(Parameter { name: CompactString::from(name), value, is_default });
                self.params.len() - 1
            }
        };
        &self.params[index].value
    }

    /// Value bound to `name` in the active frame.
    pub fn lookup(&self, name: &str) -> Option<&Value<N>> {
        self.position(name).map(|i| &self.params[i].value)
    }

    /// Parameters of the active frame in binding order.
    pub fn active(&self) -> &[Parameter<N>] {
        &self.params[self.base..]
    }

    /// Number of frames above the root frame.
    pub fn depth(&self) -> usize {
        self.saved_bases.len()
    }

    pub fn clear(&mut self) {
        self.params.clear();
        self.saved_bases.clear();
        self.base = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simple_node::SimpleNode;
    use rstest::rstest;

    type Stack = ParameterStack<SimpleNode>;

    #[rstest]
    #[case(true, true, 2.0)]
    #[case(true, false, 2.0)]
    #[case(false, true, 1.0)]
    #[case(false, false, 2.0)]
    fn explicit_values_beat_defaults(#[case] first_default: bool, #[case] second_default: bool, #[case] expected: f64) {
        let mut s = Stack::new();
        s.bind("p", Value::Number(1.0), first_default);
        let effective = s.bind("p", Value::Number(2.0), second_default).clone();
        assert_eq!(effective, Value::Number(expected));
        assert_eq!(s.lookup("p"), Some(&Value::Number(expected)));
        assert_eq!(s.active().len(), 1);
    }

    #[test]
    fn frames_hide_outer_bindings() {
        let mut s = Stack::new();
        s.bind("x", Value::Number(1.0), false);
        s.push_frame();
        assert!(s.lookup("x").is_none());
        s.push_frame();
        s.bind("x", Value::Number(2.0), false);
        s.pop_frame();
        assert!(s.lookup("x").is_none());
        s.pop_frame();
        assert_eq!(s.lookup("x"), Some(&Value::Number(1.0)));
    }

    #[test]
    fn popping_the_root_frame_is_a_no_op() {
        let mut s = Stack::new();
        s.bind("x", Value::Boolean(true), true);
        s.pop_frame();
        assert_eq!(s.lookup("x"), Some(&Value::Boolean(true)));
        assert_eq!(s.depth(), 0);
    }

    #[test]
    fn clear_resets_everything() {
        let mut s = Stack::new();
        s.push_frame();
        s.bind("x", Value::Boolean(true), false);
        s.clear();
        assert_eq!(s.depth(), 0);
        assert!(s.lookup("x").is_none());
    }
}
