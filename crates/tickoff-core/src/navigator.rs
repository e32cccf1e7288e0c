//! Linear screen history.

use tracing::debug;

/// A stack of screens whose bottom entry can never be popped.
#[derive(Debug)]
pub struct Navigator<S> {
    root: S,
    pushed: Vec<S>,
}

impl<S> Navigator<S> {
    pub fn new(root: S) -> Self {
        Self {
            root,
            pushed: Vec::new(),
        }
    }

    pub fn push(&mut self, screen: S) {
        self.pushed.push(screen);
        debug!(depth = self.depth(), "pushed screen");
    }

    /// Pops the top screen, dropping it. Returns `false` when already at the
    /// root.
    pub fn go_back(&mut self) -> bool {
        let popped = self.pushed.pop().is_some();
        if popped {
            debug!(depth = self.depth(), "popped screen");
        }
        popped
    }

    pub fn current(&self) -> &S {
        self.pushed.last().unwrap_or(&self.root)
    }

    pub fn current_mut(&mut self) -> &mut S {
        self.pushed.last_mut().unwrap_or(&mut self.root)
    }

    pub fn root(&self) -> &S {
        &self.root
    }

    pub fn depth(&self) -> usize {
        self.pushed.len() + 1
    }

    /// Every screen on the stack, bottom first.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut S> {
        std::iter::once(&mut self.root).chain(self.pushed.iter_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::Navigator;

    #[test]
    fn starts_on_root_and_never_pops_it() {
        let mut nav = Navigator::new("list");
        assert_eq!(*nav.current(), "list");
        assert!(!nav.go_back());
        assert_eq!(nav.depth(), 1);
    }

    #[test]
    fn push_then_back_returns_to_previous() {
        let mut nav = Navigator::new("list");
        nav.push("edit");
        assert_eq!(*nav.current(), "edit");
        assert_eq!(nav.depth(), 2);

        assert!(nav.go_back());
        assert_eq!(*nav.current(), "list");
    }

    #[test]
    fn iter_mut_visits_bottom_first() {
        let mut nav = Navigator::new(1);
        nav.push(2);
        nav.push(3);
        let seen: Vec<i32> = nav.iter_mut().map(|n| *n).collect();
        assert_eq!(seen, vec![1, 2, 3]);
    }
}
