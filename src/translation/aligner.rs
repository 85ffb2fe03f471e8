/*!
 * Line-level sequence alignment.
 *
 * Models sometimes merge, drop or restate lines. The aligner runs an LCS
 * diff between the lines we sent and the lines we got back and produces a
 * target sequence with exactly one entry per source line.
 */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DiffOp {
    Equal(usize, usize),
    Delete(usize),
    Insert(usize),
}

/// Two equal-length sequences, position `i` of each describing the same line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedPair {
    pub source: Vec<String>,
    pub target: Vec<String>,
}

impl AlignedPair {
    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.source.iter().map(String::as_str).zip(self.target.iter().map(String::as_str))
    }
}

fn diff<S: AsRef<str>, T: AsRef<str>>(source: &[S], target: &[T]) -> Vec<DiffOp> {
    let (n, m) = (source.len(), target.len());
    // lcs[i][j] = LCS length of source[i..] and target[j..]
    let mut lcs = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if source[i].as_ref() == target[j].as_ref() {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut ops = Vec::with_capacity(n + m);
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if source[i].as_ref() == target[j].as_ref() {
            ops.push(DiffOp::Equal(i, j));
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            ops.push(DiffOp::Delete(i));
            i += 1;
        } else {
            ops.push(DiffOp::Insert(j));
            j += 1;
        }
    }
    ops.extend((i..n).map(DiffOp::Delete));
    ops.extend((j..m).map(DiffOp::Insert));
    ops
}

/// Align `target` onto `source`.
///
/// Common lines pair up, adjacent deletion/insertion runs pair 1:1 as
/// replacements, source-only lines reuse the previous resolved target (the
/// next one at the very start) and target-only lines are dropped.
pub fn align_sequences<S: AsRef<str>, T: AsRef<str>>(source: &[S], target: &[T]) -> AlignedPair {
    let mut resolved: Vec<Option<String>> = vec![None; source.len()];
    let mut deleted: Vec<usize> = Vec::new();
    let mut inserted: Vec<usize> = Vec::new();

    let flush = |deleted: &mut Vec<usize>, inserted: &mut Vec<usize>, resolved: &mut [Option<String>]| {
        for (d, ins) in deleted.iter().zip(inserted.iter()) {
            resolved[*d] = Some(target[*ins].as_ref().to_string());
        }
        deleted.clear();
        inserted.clear();
    };

    for op in diff(source, target) {
        match op {
            DiffOp::Equal(i, j) => {
                flush(&mut deleted, &mut inserted, &mut resolved);
                resolved[i] = Some(target[j].as_ref().to_string());
            }
            DiffOp::Delete(i) => deleted.push(i),
            DiffOp::Insert(j) => inserted.push(j),
        }
    }
    flush(&mut deleted, &mut inserted, &mut resolved);

    let first_resolved = resolved.iter().flatten().next().cloned().unwrap_or_default();
    let mut previous: Option<String> = None;
    let aligned_target = resolved
        .into_iter()
        .map(|slot| {
            let value = slot.or_else(|| previous.clone()).unwrap_or_else(|| first_resolved.clone());
            previous = Some(value.clone());
            value
        })
        .collect();

    AlignedPair {
        source: source.iter().map(|s| s.as_ref().to_string()).collect(),
        target: aligned_target,
    }
}
