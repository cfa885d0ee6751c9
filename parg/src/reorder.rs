//! In-place reordering of an argument vector: options first, operands last.
//!
//! Classification is delegated to [`ParseState`], so an element counts as an
//! option exactly when scanning would report it as one. Runs are exchanged
//! with the triple-reversal block swap, which keeps the relative order of
//! each class and needs no scratch buffer.

use crate::{Event, LongOption, ParseState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Option,
    Operand,
    End,
}

/// Reorder `argv[1..]` so that options (with their values) precede operands.
///
/// Returns the split index: `argv[1..split]` are options, `argv[split..]`
/// are operands. `argv[0]` is never moved. A `--` terminator, or a trailing
/// option that is missing its value, is placed at the split itself and
/// counted on the option side.
pub fn reorder<S: AsRef<str>>(
    argv: &mut [S],
    optstring: &str,
    longopts: Option<&[LongOption<'_>]>,
) -> usize {
    if argv.len() < 2 {
        return argv.len();
    }

    // Find end of normal arguments
    let mut ps = ParseState::new();
    let mut last_index;
    loop {
        last_index = ps.next_index();
        match ps.getopt_long(&*argv, optstring, longopts, None) {
            Event::End => break,
            Event::Unknown(_) | Event::MissingValue(_) if ps.next_index() >= argv.len() => {
                last_index = ps.next_index() - 1;
                break;
            }
            _ => {}
        }
    }

    let mut split = reorder_runs(&mut argv[..last_index], optstring, longopts);

    // Rotate `--` or the dangling option into place
    if last_index < argv.len() {
        reverse(argv, split, last_index);
        reverse(argv, split, last_index + 1);
        split += 1;
    }

    split
}

/// Reorder a vector that has no `--` and does not end in an option missing
/// its value.
fn reorder_runs<S: AsRef<str>>(
    argv: &mut [S],
    optstring: &str,
    longopts: Option<&[LongOption<'_>]>,
) -> usize {
    if argv.len() < 2 {
        return argv.len();
    }

    let mut l;
    let mut m;
    let mut r;

    loop {
        // Swaps invalidate any scan in flight, so every pass starts over
        let mut ps = ParseState::new();
        let mut next = ps.next_index();
        let mut class = next_class(&mut ps, argv, optstring, longopts);
        let mut changed = false;

        loop {
            l = next;
            while class == Class::Option {
                l = ps.next_index();
                class = next_class(&mut ps, argv, optstring, longopts);
            }

            m = l;
            while class == Class::Operand {
                m = ps.next_index();
                class = next_class(&mut ps, argv, optstring, longopts);
            }

            r = m;
            while class == Class::Option {
                r = ps.next_index();
                class = next_class(&mut ps, argv, optstring, longopts);
            }

            next = r;
            while class == Class::Operand {
                next = ps.next_index();
                class = next_class(&mut ps, argv, optstring, longopts);
            }

            // [l, m) operands followed by [m, r) options
            if m < r {
                changed = true;
                reverse(argv, l, m);
                reverse(argv, m, r);
                reverse(argv, l, r);
            }

            if class == Class::End {
                break;
            }
        }

        if !changed {
            break;
        }
    }

    l + (r - m)
}

/// Classify the next whole element, scanning through any bundled cluster.
fn next_class<S: AsRef<str>>(
    ps: &mut ParseState,
    argv: &[S],
    optstring: &str,
    longopts: Option<&[LongOption<'_>]>,
) -> Class {
    loop {
        let class = match ps.getopt_long(argv, optstring, longopts, None) {
            Event::End => Class::End,
            Event::Positional(_) => Class::Operand,
            _ => Class::Option,
        };
        if !ps.in_cluster(argv) {
            return class;
        }
    }
}

fn reverse<S>(argv: &mut [S], i: usize, j: usize) {
    argv[i..j].reverse();
}
