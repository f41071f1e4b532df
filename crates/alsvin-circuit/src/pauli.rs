//! Pauli observables and k-local enumeration.
//!
//! An observable is a tensor product of single-qubit Pauli operators,
//! stored densely (one [`PauliOp`] per qubit).  The measurement set used by
//! the sampler is the ordered family of all strings whose non-identity
//! support has size between 1 and k:
//!
//!   |set| = Σ_{w=1..k} C(nq, w) · 3^w
//!
//! Downstream vectors (readout weights, shot-noise batches) are indexed
//! positionally against this set, so the enumeration order is canonical —
//! lexicographic over the underlying index tuples with I < X < Y < Z —
//! and stable across calls.

use serde::{Deserialize, Serialize};

use crate::error::{CircuitError, CircuitResult};

/// Single-qubit Pauli operator.
///
/// The discriminant order I < X < Y < Z defines the canonical
/// lexicographic order of enumerated strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PauliOp {
    /// Identity.
    I,
    /// Pauli-X.
    X,
    /// Pauli-Y.
    Y,
    /// Pauli-Z.
    Z,
}

impl PauliOp {
    /// All operators in canonical order.
    pub const ALL: [PauliOp; 4] = [PauliOp::I, PauliOp::X, PauliOp::Y, PauliOp::Z];
}

/// A dense Pauli string: one operator per qubit, qubit 0 first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PauliString {
    ops: Vec<PauliOp>,
}

impl PauliString {
    /// Construct from a dense operator list.
    pub fn new(ops: Vec<PauliOp>) -> Self {
        Self { ops }
    }

    /// The operator on each qubit, qubit 0 first.
    pub fn ops(&self) -> &[PauliOp] {
        &self.ops
    }

    /// Number of sites (qubits) the string spans.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// True for a zero-length string.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Number of non-identity sites.
    pub fn weight(&self) -> usize {
        self.ops.iter().filter(|op| **op != PauliOp::I).count()
    }

    /// True if every site is the identity.
    pub fn is_identity(&self) -> bool {
        self.weight() == 0
    }

    /// The non-identity (qubit, op) pairs, by ascending qubit index.
    pub fn support(&self) -> impl Iterator<Item = (usize, PauliOp)> + '_ {
        self.ops
            .iter()
            .enumerate()
            .filter(|(_, op)| **op != PauliOp::I)
            .map(|(q, op)| (q, *op))
    }
}

/// The ordered set of measurement observables consumed by the sampler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservableSet {
    n_qubits: usize,
    locality: usize,
    strings: Vec<PauliString>,
}

impl ObservableSet {
    /// Enumerate every Pauli string on `n_qubits` qubits with weight in
    /// `[1, k]`, in canonical lexicographic order.
    ///
    /// Errors with [`CircuitError::LocalityOutOfRange`] unless 1 ≤ k ≤ n_qubits.
    pub fn k_local(n_qubits: usize, k: usize) -> CircuitResult<Self> {
        if k == 0 || k > n_qubits {
            return Err(CircuitError::LocalityOutOfRange { k, n_qubits });
        }
        let mut strings = Vec::with_capacity(count_k_local(n_qubits, k));
        let mut prefix = Vec::with_capacity(n_qubits);
        enumerate_rec(n_qubits, k, &mut prefix, &mut strings);
        Ok(Self {
            n_qubits,
            locality: k,
            strings,
        })
    }

    /// The "2k-local" variant: locality `min(2k, n_qubits)`.
    ///
    /// Used by measurement strategies that estimate products of pairs of
    /// k-local observables.
    pub fn two_k_local(n_qubits: usize, k: usize) -> CircuitResult<Self> {
        if k == 0 || k > n_qubits {
            return Err(CircuitError::LocalityOutOfRange { k, n_qubits });
        }
        Self::k_local(n_qubits, (2 * k).min(n_qubits))
    }

    /// Number of qubits each string spans.
    pub fn n_qubits(&self) -> usize {
        self.n_qubits
    }

    /// The locality bound k used for enumeration.
    pub fn locality(&self) -> usize {
        self.locality
    }

    /// The observables in canonical order.
    pub fn strings(&self) -> &[PauliString] {
        &self.strings
    }

    /// Number of observables.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// True if the set is empty (never the case for a valid enumeration).
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl<'a> IntoIterator for &'a ObservableSet {
    type Item = &'a PauliString;
    type IntoIter = std::slice::Iter<'a, PauliString>;

    fn into_iter(self) -> Self::IntoIter {
        self.strings.iter()
    }
}

/// Closed-form size of the weight-[1,k] enumeration: Σ C(nq,w)·3^w.
pub fn count_k_local(n_qubits: usize, k: usize) -> usize {
    (1..=k.min(n_qubits))
        .map(|w| binomial(n_qubits, w) * 3usize.pow(w as u32))
        .sum()
}

/// Depth-first enumeration in lexicographic order over index tuples.
///
/// At each site the branches are tried as I, X, Y, Z; the I branch is
/// pruned when the remaining sites cannot reach weight ≥ 1, and the
/// non-identity branches when the weight budget is spent.
fn enumerate_rec(
    n_qubits: usize,
    max_weight: usize,
    prefix: &mut Vec<PauliOp>,
    out: &mut Vec<PauliString>,
) {
    if prefix.len() == n_qubits {
        // Weight bounds were enforced while descending; only the
        // all-identity string needs excluding here.
        if prefix.iter().any(|op| *op != PauliOp::I) {
            out.push(PauliString::new(prefix.clone()));
        }
        return;
    }
    let weight = prefix.iter().filter(|op| **op != PauliOp::I).count();
    for op in PauliOp::ALL {
        if op != PauliOp::I && weight == max_weight {
            continue;
        }
        prefix.push(op);
        enumerate_rec(n_qubits, max_weight, prefix, out);
        prefix.pop();
    }
}

fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut acc = 1usize;
    for i in 0..k {
        acc = acc * (n - i) / (i + 1);
    }
    acc
}
