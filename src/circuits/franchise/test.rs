#[cfg(test)]
mod test {
    use ark_bn254::Fr;
    use ark_ff::{One, Zero};
    use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem};
    use ark_std::rand::{rngs::StdRng, SeedableRng};

    use crate::circuits::franchise::poseidon_params::bn254_poseidon_params;
    use crate::circuits::franchise::{franchise_circuit::FranchiseCircuit, MockingCircuit};
    use crate::circuits::franchise::{
        prover::franchise_prove, setup::franchise_setup, verifier::franchise_verify,
    };
    use crate::encoding::{field_from_le_bytes, field_to_le_bytes};
    use crate::{Constraint, Error};

    type F = Fr;

    const LEVELS: usize = 32;

    fn make_mocking_circuit(voting_weight: u64, factory_weight: u64) -> FranchiseCircuit<F> {
        let mut rng = StdRng::seed_from_u64(voting_weight * 1000 + factory_weight);
        <FranchiseCircuit<F> as MockingCircuit<F>>::generate_circuit(
            bn254_poseidon_params(),
            LEVELS,
            voting_weight,
            factory_weight,
            &mut rng,
        )
        .unwrap()
    }

    // synthesis itself may refuse some assignments, e.g. an inverse of zero
    fn is_satisfied(circuit: FranchiseCircuit<F>) -> bool {
        let cs = ConstraintSystem::<F>::new_ref();
        match circuit.generate_constraints(cs.clone()) {
            Ok(()) => cs.is_satisfied().unwrap(),
            Err(_) => false,
        }
    }

    fn flip_low_bit(value: F) -> F {
        let mut bytes = field_to_le_bytes(&value);
        bytes[0] ^= 1;
        field_from_le_bytes(&bytes).unwrap()
    }

    fn assert_rejected(circuit: FranchiseCircuit<F>, constraint: Constraint) {
        match circuit.check_witness() {
            Err(Error::Unsatisfiable(c)) => assert_eq!(c, constraint),
            other => panic!("expected {:?}, got {:?}", constraint, other),
        }
        assert!(!is_satisfied(circuit));
    }

    #[test]
    fn test_franchise_constraints() {
        let test_circuit = make_mocking_circuit(5, 10);
        let cs = ConstraintSystem::<F>::new_ref();

        test_circuit.check_witness().unwrap();
        test_circuit.clone().generate_constraints(cs.clone()).unwrap();
        println!("Number of constraints: {}", cs.num_constraints());
        assert!(cs.is_satisfied().unwrap());
    }

    #[test]
    fn test_equal_weights_are_allowed() {
        let test_circuit = make_mocking_circuit(10, 10);
        test_circuit.check_witness().unwrap();
        assert!(is_satisfied(test_circuit));
    }

    #[test]
    fn test_overspend_is_unsatisfiable() {
        assert_rejected(make_mocking_circuit(11, 10), Constraint::WeightBound);
    }

    #[test]
    fn test_weight_outside_comparable_range() {
        let mut test_circuit = make_mocking_circuit(5, 10);
        test_circuit.witness.voting_weight = Some(-F::one());
        assert_rejected(test_circuit, Constraint::WeightRange);
    }

    #[test]
    fn test_private_input_bit_flips_are_unsatisfiable() {
        let base = make_mocking_circuit(5, 10);

        let mut test_circuit = base.clone();
        test_circuit.witness.password = test_circuit.witness.password.map(flip_low_bit);
        assert_rejected(test_circuit, Constraint::CikMembership);

        let mut test_circuit = base.clone();
        test_circuit.witness.signature = test_circuit.witness.signature.map(flip_low_bit);
        assert_rejected(test_circuit, Constraint::CikMembership);

        let mut test_circuit = base;
        test_circuit.witness.address = test_circuit.witness.address.map(flip_low_bit);
        assert_rejected(test_circuit, Constraint::CikMembership);
    }

    #[test]
    fn test_zero_vote_hash_is_rejected() {
        let mut test_circuit = make_mocking_circuit(5, 10);
        if let Some(vote_hash) = test_circuit.instance.vote_hash.as_mut() {
            vote_hash[1] = F::zero();
        }
        assert_rejected(test_circuit, Constraint::VoteHashZero);
    }

    #[test]
    fn test_non_zero_padding_is_rejected() {
        let mut test_circuit = make_mocking_circuit(5, 10);
        if let Some(siblings) = test_circuit.witness.census_siblings.as_mut() {
            siblings[LEVELS - 1] = F::one();
        }
        assert_rejected(test_circuit, Constraint::SiblingPadding);
    }

    #[test]
    fn test_used_depth_must_match_path() {
        let base = make_mocking_circuit(5, 10);

        let mut test_circuit = base.clone();
        test_circuit.witness.cik_used_depth = test_circuit.witness.cik_used_depth.map(|d| d + 1);
        assert_rejected(test_circuit, Constraint::CikMembership);

        let mut test_circuit = base;
        test_circuit.witness.cik_used_depth = Some(LEVELS + 1);
        assert_rejected(test_circuit, Constraint::UsedDepth);
    }

    #[test]
    fn test_wrong_nullifier_is_rejected() {
        let mut test_circuit = make_mocking_circuit(5, 10);
        test_circuit.instance.nullifier = test_circuit.instance.nullifier.map(|n| n + F::one());
        assert_rejected(test_circuit, Constraint::Nullifier);
    }

    #[test]
    fn test_shallow_mock_circuits() {
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let test_circuit = <FranchiseCircuit<F> as MockingCircuit<F>>::generate_circuit(
                bn254_poseidon_params(),
                8,
                5,
                10,
                &mut rng,
            )
            .unwrap();
            test_circuit.check_witness().unwrap();
        }
    }

    #[test]
    fn test_franchise_prove() {
        let mut rng = StdRng::seed_from_u64(77);
        let test_circuit = make_mocking_circuit(5, 10);
        let public_signals = test_circuit.public_signals().unwrap();

        let (pk, vk) = franchise_setup(test_circuit.clone(), &mut rng).unwrap();
        let proof = franchise_prove(&pk, test_circuit, &mut rng).unwrap();
        assert!(franchise_verify(&vk, &proof, &public_signals).unwrap());

        let mut other_election = public_signals;
        other_election.election_id[0] += F::one();
        assert!(!franchise_verify(&vk, &proof, &other_election).unwrap());

        assert!(matches!(
            franchise_prove(&pk, make_mocking_circuit(11, 10), &mut rng),
            Err(Error::Unsatisfiable(Constraint::WeightBound))
        ));
    }
}
