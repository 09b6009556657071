//! SVG path-data parser.
//!
//! Supports M/L/H/V/C/S/Q/T/A/Z in absolute and relative form with implicit
//! command repetition. The tokenizer is tolerant: bytes that are neither a
//! command letter nor part of a number are skipped (logged once per parse),
//! matching the fail-soft policy of the rest of the engine.
//!
//! Geometric simplifications, all deliberate: S and T degrade to straight
//! lines to their stated endpoint, and arcs keep only their endpoints and
//! radii for chord-based evaluation.

use log::warn;
use nalgebra::Point2;

use super::Segment;

struct Tokenizer<'a> {
    bytes: &'a [u8],
    pos: usize,
    skipped: bool,
}

impl<'a> Tokenizer<'a> {
    fn new(data: &'a str) -> Self {
        Self {
            bytes: data.as_bytes(),
            pos: 0,
            skipped: false,
        }
    }

    #[inline]
    fn skip_separators(&mut self) {
        while let Some(&b) = self.bytes.get(self.pos) {
            if b == b' ' || b == b',' || b == b'\t' || b == b'\n' || b == b'\r' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// Advance to the next command letter, discarding anything else.
    fn next_command(&mut self) -> Option<u8> {
        loop {
            self.skip_separators();
            let b = *self.bytes.get(self.pos)?;
            self.pos += 1;
            if b.is_ascii_alphabetic() {
                return Some(b);
            }
            self.skipped = true;
        }
    }

    /// Read the next number, or None when a command letter (or the end of
    /// input) comes first.
    fn next_number(&mut self) -> Option<f64> {
        loop {
            self.skip_separators();
            let b = *self.bytes.get(self.pos)?;
            if b.is_ascii_alphabetic() {
                return None;
            }
            let start = self.pos;
            if b == b'+' || b == b'-' {
                self.pos += 1;
            }
            let mut digits = false;
            let mut dot = false;
            while let Some(&c) = self.bytes.get(self.pos) {
                match c {
                    b'0'..=b'9' => {
                        digits = true;
                        self.pos += 1;
                    }
                    b'.' if !dot => {
                        dot = true;
                        self.pos += 1;
                    }
                    b'e' | b'E' if digits => {
                        let mut ahead = self.pos + 1;
                        if matches!(self.bytes.get(ahead), Some(b'+') | Some(b'-')) {
                            ahead += 1;
                        }
                        if !matches!(self.bytes.get(ahead), Some(b'0'..=b'9')) {
                            break;
                        }
                        self.pos = ahead + 1;
                        while matches!(self.bytes.get(self.pos), Some(b'0'..=b'9')) {
                            self.pos += 1;
                        }
                        break;
                    }
                    _ => break,
                }
            }
            if !digits {
                // Not a number after all; drop one byte and retry.
                self.pos = start + 1;
                self.skipped = true;
                continue;
            }
            // The slice holds only sign/digit/dot/exponent bytes here.
            match std::str::from_utf8(&self.bytes[start..self.pos])
                .ok()
                .and_then(|s| s.parse::<f64>().ok())
            {
                Some(n) => return Some(n),
                None => {
                    self.pos = start + 1;
                    self.skipped = true;
                }
            }
        }
    }
}

/// Parse path data into a segment list. Unparseable content yields an empty
/// or partial list rather than an error.
pub(super) fn parse_segments(data: &str) -> Vec<Segment> {
    let mut tok = Tokenizer::new(data);
    let mut segments = Vec::new();

    let mut current = Point2::new(0.0, 0.0);
    let mut subpath_start = current;

    while let Some(cmd) = tok.next_command() {
        let relative = cmd.is_ascii_lowercase();
        let op = cmd.to_ascii_uppercase();

        if op == b'Z' {
            if current != subpath_start {
                segments.push(Segment::line(current, subpath_start));
            }
            current = subpath_start;
            continue;
        }

        // Implicit repetition: keep consuming coordinate groups until the
        // next command letter. A repeated M behaves as L.
        let mut first_group = true;
        loop {
            let Some(a) = tok.next_number() else { break };
            let point = |x: f64, y: f64, from: Point2<f64>| {
                if relative {
                    Point2::new(from.x + x, from.y + y)
                } else {
                    Point2::new(x, y)
                }
            };

            match op {
                b'M' => {
                    let Some(b) = tok.next_number() else { break };
                    let to = point(a, b, current);
                    if first_group {
                        subpath_start = to;
                    } else {
                        segments.push(Segment::line(current, to));
                    }
                    current = to;
                }
                b'L' => {
                    let Some(b) = tok.next_number() else { break };
                    let to = point(a, b, current);
                    segments.push(Segment::line(current, to));
                    current = to;
                }
                b'H' => {
                    let to = if relative {
                        Point2::new(current.x + a, current.y)
                    } else {
                        Point2::new(a, current.y)
                    };
                    segments.push(Segment::line(current, to));
                    current = to;
                }
                b'V' => {
                    let to = if relative {
                        Point2::new(current.x, current.y + a)
                    } else {
                        Point2::new(current.x, a)
                    };
                    segments.push(Segment::line(current, to));
                    current = to;
                }
                b'C' => {
                    let Some(b) = tok.next_number() else { break };
                    let Some(c) = tok.next_number() else { break };
                    let Some(d) = tok.next_number() else { break };
                    let Some(e) = tok.next_number() else { break };
                    let Some(f) = tok.next_number() else { break };
                    let c1 = point(a, b, current);
                    let c2 = point(c, d, current);
                    let to = point(e, f, current);
                    segments.push(Segment::cubic(current, c1, c2, to));
                    current = to;
                }
                b'Q' => {
                    let Some(b) = tok.next_number() else { break };
                    let Some(c) = tok.next_number() else { break };
                    let Some(d) = tok.next_number() else { break };
                    let c1 = point(a, b, current);
                    let to = point(c, d, current);
                    segments.push(Segment::quadratic(current, c1, to));
                    current = to;
                }
                b'S' => {
                    // Smooth cubic shorthand, degraded to a line.
                    let Some(b) = tok.next_number() else { break };
                    let Some(c) = tok.next_number() else { break };
                    let Some(d) = tok.next_number() else { break };
                    let _ = (a, b);
                    let to = point(c, d, current);
                    segments.push(Segment::line(current, to));
                    current = to;
                }
                b'T' => {
                    // Smooth quadratic shorthand, degraded to a line.
                    let Some(b) = tok.next_number() else { break };
                    let to = point(a, b, current);
                    segments.push(Segment::line(current, to));
                    current = to;
                }
                b'A' => {
                    let Some(ry) = tok.next_number() else { break };
                    let Some(_rotation) = tok.next_number() else { break };
                    let Some(_large_arc) = tok.next_number() else { break };
                    let Some(_sweep) = tok.next_number() else { break };
                    let Some(x) = tok.next_number() else { break };
                    let Some(y) = tok.next_number() else { break };
                    let to = point(x, y, current);
                    segments.push(Segment::arc(current, to, a, ry));
                    current = to;
                }
                _ => {
                    // Unknown command letter; discard its numbers.
                    tok.skipped = true;
                    while tok.next_number().is_some() {}
                    break;
                }
            }
            first_group = false;
        }
    }

    if tok.skipped {
        warn!("path data contained unrecognized content; skipped");
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_and_close() {
        let segs = parse_segments("M 0 0 L 100 0 L 100 50 Z");
        assert_eq!(segs.len(), 3);
        match &segs[2] {
            Segment::Line { to, .. } => assert_eq!(*to, Point2::new(0.0, 0.0)),
            other => panic!("expected closing line, got {other:?}"),
        }
    }

    #[test]
    fn relative_commands_accumulate() {
        let segs = parse_segments("M 10 10 l 20 0 v 5 h -20");
        assert_eq!(segs.len(), 3);
        match &segs[2] {
            Segment::Line { from, to } => {
                assert_eq!(*from, Point2::new(30.0, 15.0));
                assert_eq!(*to, Point2::new(10.0, 15.0));
            }
            other => panic!("expected line, got {other:?}"),
        }
    }

    #[test]
    fn implicit_repetition() {
        // One L letter, three coordinate pairs.
        let segs = parse_segments("M 0 0 L 10 0 20 0 30 0");
        assert_eq!(segs.len(), 3);
    }

    #[test]
    fn junk_is_skipped() {
        let segs = parse_segments("M 0 0 ## L 100 @ 0");
        assert_eq!(segs.len(), 1);
    }

    #[test]
    fn compact_negative_numbers() {
        let segs = parse_segments("M0 0L10-20");
        assert_eq!(segs.len(), 1);
        match &segs[0] {
            Segment::Line { to, .. } => assert_eq!(*to, Point2::new(10.0, -20.0)),
            other => panic!("expected line, got {other:?}"),
        }
    }

    #[test]
    fn shorthand_curves_degrade_to_lines() {
        let segs = parse_segments("M 0 0 S 10 10 20 0 T 40 0");
        assert_eq!(segs.len(), 2);
        assert!(matches!(segs[0], Segment::Line { .. }));
        assert!(matches!(segs[1], Segment::Line { .. }));
    }

    #[test]
    fn empty_input() {
        assert!(parse_segments("").is_empty());
        assert!(parse_segments("not a path").is_empty());
    }
}
