use crate::chart::DataPoint;

/// Two corners in data space. A trend line joins them, a rectangle spans them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start_candle: f32,
    pub start_price: f32,
    pub end_candle: f32,
    pub end_price: f32,
}

impl Segment {
    /// A zero-length segment anchored at `at`, as created on button press.
    pub fn begin(at: DataPoint) -> Self {
        Self {
            start_candle: at.candle,
            start_price: at.price,
            end_candle: at.candle,
            end_price: at.price,
        }
    }

    pub fn update(&mut self, to: DataPoint) {
        self.end_candle = to.candle;
        self.end_price = to.price;
    }

    pub fn start(&self) -> DataPoint {
        DataPoint::new(self.start_candle, self.start_price)
    }

    pub fn end(&self) -> DataPoint {
        DataPoint::new(self.end_candle, self.end_price)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub candle: f32,
    pub price: f32,
    pub text: String,
}

impl TextLabel {
    pub fn anchor(&self) -> DataPoint {
        DataPoint::new(self.candle, self.price)
    }
}

/// Text being typed, anchored where the cursor was when typing began.
#[derive(Debug, Clone, PartialEq)]
pub struct TextDraft {
    anchor: DataPoint,
    buffer: String,
}

impl TextDraft {
    pub fn begin(anchor: DataPoint) -> Self {
        Self {
            anchor,
            buffer: String::new(),
        }
    }

    /// Printable ASCII only; anything else is ignored.
    pub fn append_char(&mut self, c: char) {
        if is_printable(c) {
            self.buffer.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.buffer.pop();
    }

    pub fn anchor(&self) -> DataPoint {
        self.anchor
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }
}

pub fn is_printable(c: char) -> bool {
    matches!(c, ' '..='~')
}

/// Borrowed view of the annotation currently being authored, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pending<'a> {
    None,
    Line(&'a Segment),
    Rect(&'a Segment),
    Text(&'a TextDraft),
}

/// Committed annotations, one append-only stack per kind.
///
/// Insertion order is paint order and undo order.
#[derive(Debug, Clone, Default)]
pub struct Annotations {
    lines: Vec<Segment>,
    rects: Vec<Segment>,
    texts: Vec<TextLabel>,
}

impl Annotations {
    pub fn lines(&self) -> &[Segment] {
        &self.lines
    }

    pub fn rects(&self) -> &[Segment] {
        &self.rects
    }

    pub fn texts(&self) -> &[TextLabel] {
        &self.texts
    }

    /// Finishes a line at `at`. With `snap_horizontal` the end keeps the
    /// start price, regardless of where the cursor was released.
    pub fn commit_line(&mut self, mut draft: Segment, at: DataPoint, snap_horizontal: bool) {
        draft.update(at);
        if snap_horizontal {
            draft.end_price = draft.start_price;
        }

        log::debug!("Line committed: {draft:?}");
        self.lines.push(draft);
    }

    pub fn commit_rect(&mut self, mut draft: Segment, at: DataPoint) {
        draft.update(at);

        log::debug!("Rectangle committed: {draft:?}");
        self.rects.push(draft);
    }

    /// Stores the draft as a label unless nothing was typed. Returns whether
    /// a label was added.
    pub fn commit_text(&mut self, draft: TextDraft) -> bool {
        if draft.buffer.is_empty() {
            log::debug!("Empty text discarded");
            return false;
        }

        let TextDraft { anchor, buffer } = draft;
        self.texts.push(TextLabel {
            candle: anchor.candle,
            price: anchor.price,
            text: buffer,
        });

        true
    }

    pub fn undo_last_line(&mut self) -> Option<Segment> {
        self.lines.pop()
    }

    pub fn undo_last_rect(&mut self) -> Option<Segment> {
        self.rects.pop()
    }

    pub fn undo_last_text(&mut self) -> Option<TextLabel> {
        self.texts.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_release_snaps_line_to_start_price() {
        let mut annotations = Annotations::default();
        let draft = Segment::begin(DataPoint::new(12.0, 100.0));

        annotations.commit_line(draft, DataPoint::new(15.0, 110.0), true);

        assert_eq!(
            annotations.lines(),
            &[Segment {
                start_candle: 12.0,
                start_price: 100.0,
                end_candle: 15.0,
                end_price: 100.0,
            }]
        );
    }

    #[test]
    fn plain_release_keeps_cursor_price() {
        let mut annotations = Annotations::default();
        let mut draft = Segment::begin(DataPoint::new(12.0, 100.0));
        draft.update(DataPoint::new(13.0, 104.0));

        annotations.commit_line(draft, DataPoint::new(15.0, 110.0), false);

        assert_eq!(annotations.lines()[0].end(), DataPoint::new(15.0, 110.0));
    }

    #[test]
    fn rect_spans_press_and_release_corners() {
        let mut annotations = Annotations::default();
        let draft = Segment::begin(DataPoint::new(3.0, 20.0));

        annotations.commit_rect(draft, DataPoint::new(8.0, 25.0));

        let rect = annotations.rects()[0];
        assert_eq!(rect.start(), DataPoint::new(3.0, 20.0));
        assert_eq!(rect.end(), DataPoint::new(8.0, 25.0));
    }

    #[test]
    fn empty_text_is_not_stored() {
        let mut annotations = Annotations::default();
        let mut draft = TextDraft::begin(DataPoint::new(1.0, 2.0));
        draft.append_char('a');
        draft.backspace();

        assert!(!annotations.commit_text(draft));
        assert!(annotations.texts().is_empty());
    }

    #[test]
    fn text_editing_ignores_control_characters() {
        let mut draft = TextDraft::begin(DataPoint::default());
        for c in "bu\ty\u{7f}".chars() {
            draft.append_char(c);
        }
        draft.backspace();
        draft.append_char('y');

        assert_eq!(draft.buffer(), "buy");

        let mut empty = TextDraft::begin(DataPoint::default());
        empty.backspace();
        assert_eq!(empty.buffer(), "");
    }

    #[test]
    fn undo_pops_most_recent_first() {
        let mut annotations = Annotations::default();
        for i in 0..3 {
            let draft = Segment::begin(DataPoint::new(i as f32, 1.0));
            annotations.commit_line(draft, DataPoint::new(i as f32 + 1.0, 2.0), false);
        }

        assert_eq!(annotations.undo_last_line().map(|l| l.start_candle), Some(2.0));
        assert_eq!(annotations.undo_last_line().map(|l| l.start_candle), Some(1.0));
        assert_eq!(annotations.lines().len(), 1);
    }

    #[test]
    fn undo_on_empty_stacks_is_a_no_op() {
        let mut annotations = Annotations::default();

        assert!(annotations.undo_last_line().is_none());
        assert!(annotations.undo_last_rect().is_none());
        assert!(annotations.undo_last_text().is_none());
        assert!(annotations.lines().is_empty());
        assert!(annotations.rects().is_empty());
        assert!(annotations.texts().is_empty());
    }
}
