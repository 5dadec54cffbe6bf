//! Arc-level rewrites: projection, inversion, weight removal, sorting.

use crate::fst::VectorFst;
use crate::semiring::Semiring;

/// Which tape a projection keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectType {
    Input,
    Output,
}

/// Which label arcs are sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortType {
    ILabel,
    OLabel,
}

/// Turns the machine into an acceptor over one of its tapes.
pub fn project<W: Semiring>(fst: &mut VectorFst<W>, ptype: ProjectType) {
    for s in fst.states() {
        for arc in fst.arcs_mut(s) {
            match ptype {
                ProjectType::Input => arc.olabel = arc.ilabel,
                ProjectType::Output => arc.ilabel = arc.olabel,
            }
        }
    }
    match ptype {
        ProjectType::Input => {
            let syms = fst.input_symbols().cloned();
            fst.set_output_symbols(syms);
        }
        ProjectType::Output => {
            let syms = fst.output_symbols().cloned();
            fst.set_input_symbols(syms);
        }
    }
}

/// Swaps the tapes (and the symbol attachments with them).
pub fn invert<W: Semiring>(fst: &mut VectorFst<W>) {
    for s in fst.states() {
        for arc in fst.arcs_mut(s) {
            std::mem::swap(&mut arc.ilabel, &mut arc.olabel);
        }
    }
    let isyms = fst.input_symbols().cloned();
    let osyms = fst.output_symbols().cloned();
    fst.set_input_symbols(osyms);
    fst.set_output_symbols(isyms);
}

/// Maps every arc weight to `One` and every nonzero final weight to `One`.
pub fn rm_weight<W: Semiring>(fst: &mut VectorFst<W>) {
    for s in fst.states() {
        for arc in fst.arcs_mut(s) {
            arc.weight = W::one();
        }
        if fst.final_weight(s) != W::zero() {
            fst.set_final(s, W::one());
        }
    }
}

/// Stable-sorts every state's arcs by the chosen label.
pub fn arc_sort<W: Semiring>(fst: &mut VectorFst<W>, stype: SortType) {
    for s in fst.states() {
        match stype {
            SortType::ILabel => fst.arcs_mut(s).sort_by_key(|a| a.ilabel),
            SortType::OLabel => fst.arcs_mut(s).sort_by_key(|a| a.olabel),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::{is_acceptor, is_unweighted};
    use crate::semiring::TropicalWeight;
    use crate::testing::{byte_labels, linear, relates};

    #[test]
    fn project_output_keeps_lower_tape() {
        let mut fst = linear(&[(b'a' as i64, b'b' as i64)]);
        project(&mut fst, ProjectType::Output);
        assert!(is_acceptor(&fst));
        assert!(relates(&fst, &byte_labels("b"), &byte_labels("b")));
    }

    #[test]
    fn invert_swaps_tapes() {
        let mut fst = linear(&[(b'a' as i64, b'b' as i64)]);
        invert(&mut fst);
        assert!(relates(&fst, &byte_labels("b"), &byte_labels("a")));
        assert!(!relates(&fst, &byte_labels("a"), &byte_labels("b")));
    }

    #[test]
    fn rm_weight_clears_arc_and_final_weights() {
        let mut fst = linear(&[(b'a' as i64, b'a' as i64)]);
        fst.arcs_mut(0)[0].weight = TropicalWeight(3.0);
        fst.set_final(1, TropicalWeight(2.0));
        rm_weight(&mut fst);
        assert!(is_unweighted(&fst));
    }

    #[test]
    fn arc_sort_orders_by_selected_label() {
        let mut fst = linear(&[(b'z' as i64, b'a' as i64)]);
        let target = fst.arcs(0)[0].nextstate;
        fst.add_arc(0, crate::fst::Arc::new(b'a' as i64, b'z' as i64, TropicalWeight(0.0), target));
        arc_sort(&mut fst, SortType::ILabel);
        assert!(fst.arcs(0)[0].ilabel < fst.arcs(0)[1].ilabel);
        arc_sort(&mut fst, SortType::OLabel);
        assert!(fst.arcs(0)[0].olabel < fst.arcs(0)[1].olabel);
    }
}
