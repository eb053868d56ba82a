use crate::transform::LineTransform;
use core_events::{Change, Line};
use tracing::debug;

/// One materialized step of the pipeline.
///
/// Output is append-only between invalidations. `version` increases exactly when
/// the output is discarded (upstream `Clear`, parameter change, rebuild).
pub struct Stage {
    transform: Box<dyn LineTransform>,
    lines: Vec<Line>,
    version: u64,
    seen_revision: u64,
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("name", &self.name())
            .field("lines", &self.lines.len())
            .field("version", &self.version)
            .finish()
    }
}

impl Stage {
    pub fn new(transform: impl LineTransform + 'static) -> Self {
        let seen_revision = transform.revision();
        Self {
            transform: Box::new(transform),
            lines: Vec::new(),
            version: 0,
            seen_revision,
        }
    }

    pub fn name(&self) -> &'static str {
        self.transform.name()
    }

    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[inline]
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn transform<T: LineTransform + 'static>(&self) -> Option<&T> {
        self.transform.as_any().downcast_ref::<T>()
    }

    /// Mutable access to the concrete transform, e.g. to change filter parameters.
    pub fn transform_mut<T: LineTransform + 'static>(&mut self) -> Option<&mut T> {
        self.transform.as_any_mut().downcast_mut::<T>()
    }

    /// Discard all output and bump the version.
    pub fn invalidate(&mut self) {
        self.lines.clear();
        self.version += 1;
        debug!(target: "pipeline", stage = self.name(), version = self.version, "invalidate");
    }

    /// Process one upstream change and return what this stage contributes downstream.
    ///
    /// `Clear` invalidates and is forwarded as-is; `Append` yields only the lines
    /// this call added (possibly none).
    pub fn apply(&mut self, change: &Change) -> Change {
        match change {
            Change::Clear => {
                self.invalidate();
                Change::Clear
            }
            Change::Append(lines) => {
                let start = self.lines.len();
                self.push_transformed(lines);
                Change::Append(self.lines[start..].to_vec())
            }
        }
    }

    /// Invalidate if the transform's parameters changed since last observed.
    pub fn refresh(&mut self) -> bool {
        let revision = self.transform.revision();
        if revision == self.seen_revision {
            return false;
        }
        self.seen_revision = revision;
        self.invalidate();
        true
    }

    /// Recompute the whole output from `upstream`.
    pub fn rebuild_from(&mut self, upstream: &[Line]) {
        self.invalidate();
        self.push_transformed(upstream);
    }

    fn push_transformed(&mut self, input: &[Line]) {
        let transform = &self.transform;
        self.lines
            .extend(input.iter().filter_map(|line| transform.transform(line)));
    }
}
