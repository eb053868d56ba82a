use core_events::{Line, LineSource};
use core_render::{FrameKind, RenderEngine, ViewportCache};
use core_terminal::TerminalCapabilities;

struct VecSource {
    version: u64,
    lines: Vec<Line>,
}

impl VecSource {
    fn numbered(count: usize) -> Self {
        Self {
            version: 1,
            lines: (0..count).map(|i| Line::content(format!("row {i}"))).collect(),
        }
    }
}

impl LineSource for VecSource {
    fn version(&self) -> u64 {
        self.version
    }
    fn len(&self) -> usize {
        self.lines.len()
    }
    fn line(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }
}

fn xterm() -> TerminalCapabilities {
    TerminalCapabilities::from_term(Some("xterm-256color"))
}

fn frame(
    engine: &mut RenderEngine,
    cache: &mut ViewportCache,
    src: &VecSource,
    status: &str,
) -> (FrameKind, String) {
    cache.sync(src);
    let mut out = Vec::new();
    let kind = engine.render(cache, src, status, &mut out).unwrap();
    (kind, String::from_utf8(out).unwrap())
}

#[test]
fn first_frame_paints_everything() {
    let src = VecSource::numbered(3);
    let mut cache = ViewportCache::new(20, 5);
    let mut engine = RenderEngine::new(xterm());

    let (kind, out) = frame(&mut engine, &mut cache, &src, "status");
    assert_eq!(kind, FrameKind::Full);
    assert_eq!(engine.last_repaint_rows(), &[0, 1, 2, 3, 4]);
    assert!(out.contains("row 0") && out.contains("row 2"));
    assert!(out.contains('~'), "virtual rows show the filler");
    assert!(out.contains("status"));
    assert_eq!(engine.metrics_snapshot().full_frames, 1);
}

#[test]
fn unchanged_frame_is_idle() {
    let src = VecSource::numbered(3);
    let mut cache = ViewportCache::new(20, 5);
    let mut engine = RenderEngine::new(xterm());
    frame(&mut engine, &mut cache, &src, "status");

    let (kind, out) = frame(&mut engine, &mut cache, &src, "status");
    assert_eq!(kind, FrameKind::Idle);
    assert!(out.is_empty());
    assert_eq!(engine.metrics_snapshot().status_skipped, 1);
}

#[test]
fn growth_repaints_only_new_rows() {
    let mut src = VecSource::numbered(3);
    let mut cache = ViewportCache::new(20, 5);
    let mut engine = RenderEngine::new(xterm());
    frame(&mut engine, &mut cache, &src, "s");

    src.lines.push(Line::content("row 3"));
    let (kind, out) = frame(&mut engine, &mut cache, &src, "s");
    assert_eq!(kind, FrameKind::Partial);
    assert_eq!(engine.last_repaint_rows(), &[3]);
    assert!(out.contains("row 3"));
    assert!(!out.contains("row 0"));
    // row 4 was revalidated but is still the same virtual filler
    assert_eq!(engine.metrics_snapshot().rows_skipped, 1);
}

#[test]
fn small_scroll_uses_scroll_region() {
    let src = VecSource::numbered(20);
    let mut cache = ViewportCache::new(20, 5);
    let mut engine = RenderEngine::new(xterm());
    frame(&mut engine, &mut cache, &src, "s");

    cache.scroll_by(&src, 1);
    let (_, out) = frame(&mut engine, &mut cache, &src, "s");
    assert!(out.contains("\x1b[1;5r\x1b[1S\x1b[r"));
    assert_eq!(engine.last_repaint_rows(), &[4]);
    assert!(out.contains("row 5"));
    assert_eq!(engine.metrics_snapshot().scroll_region_shifts, 1);

    cache.scroll_by(&src, -1);
    let (_, out) = frame(&mut engine, &mut cache, &src, "s");
    assert!(out.contains("\x1b[1;5r\x1b[1T\x1b[r"));
    assert_eq!(engine.last_repaint_rows(), &[0]);
}

#[test]
fn dumb_terminal_repaints_instead_of_scrolling() {
    let src = VecSource::numbered(20);
    let mut cache = ViewportCache::new(20, 5);
    let mut engine = RenderEngine::new(TerminalCapabilities::from_term(Some("dumb")));
    frame(&mut engine, &mut cache, &src, "s");

    cache.scroll_by(&src, 1);
    let (_, out) = frame(&mut engine, &mut cache, &src, "s");
    assert!(!out.contains("\x1b[1;5r"));
    assert_eq!(engine.last_repaint_rows(), &[0, 1, 2, 3, 4]);
    assert_eq!(engine.metrics_snapshot().scroll_shift_degraded_full, 1);
}

#[test]
fn invalidate_forces_full_frame() {
    let src = VecSource::numbered(2);
    let mut cache = ViewportCache::new(20, 3);
    let mut engine = RenderEngine::new(xterm());
    frame(&mut engine, &mut cache, &src, "s");

    cache.resize(30, 4);
    engine.invalidate();
    let (kind, _) = frame(&mut engine, &mut cache, &src, "s");
    assert_eq!(kind, FrameKind::Full);
    assert_eq!(engine.last_repaint_rows(), &[0, 1, 2, 3]);
}

#[test]
fn truncated_rows_get_marker() {
    let src = VecSource {
        version: 1,
        lines: vec![Line::content("abcdefghijkl")],
    };
    let mut cache = ViewportCache::new(6, 1);
    let mut engine = RenderEngine::new(xterm());
    let (_, out) = frame(&mut engine, &mut cache, &src, "s");
    assert!(out.contains("abcde"));
    assert!(!out.contains("abcdef"));
    assert!(out.contains('>'));
}
