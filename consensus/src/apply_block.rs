use crate::accept_transaction::valid_transaction;
use crate::apply_transaction::apply_transaction;
use crate::error::Error;
use crate::traits::{ProofVerifier, SignatureVerifier};
use chain::Currency;
use network::ConsensusParams;
use storage::{
    ConsensusStore, DelayedSiacoinOutputDiff, DiffDirection, FileContractDiff, ProcessedBlock,
    SiacoinOutputDiff,
};

/// First-time forward integration of a block sitting at the current tip.
///
/// On success the block's diff lists are frozen, the state checksum is
/// recorded and the processed block is stored. On a validation failure the
/// partial work is unwound through the very diffs it recorded, so the
/// ledger is left exactly as it was found.
pub fn generate_and_apply_diffs<S>(
    store: &mut S,
    pb: &mut ProcessedBlock,
    params: &ConsensusParams,
    signatures: &dyn SignatureVerifier,
    proofs: &dyn ProofVerifier,
) -> Result<(), Error>
where
    S: ConsensusStore,
{
    if pb.diffs_generated {
        return Err(storage::Error::DiffsAlreadyGenerated.into());
    }

    store.push_path(&pb.id(), &pb.parent)?;
    store.create_delayed_bucket(pb.height + params.maturity_delay)?;

    if let Err(err) = apply_block_contents(store, pb, params, signatures, proofs) {
        unwind_partial_block(store, pb, params)?;
        return Err(err);
    }

    if pb.height > params.maturity_delay {
        store.delete_delayed_bucket(pb.height)?;
    }

    pb.consensus_checksum = Some(store.consensus_checksum()?);
    pb.diffs_generated = true;
    store.put_block(pb)?;

    trace!(
        target: "consensus",
        "generated diffs for block {} at height {}",
        pb.id(),
        pb.height,
    );
    Ok(())
}

fn apply_block_contents<S>(
    store: &mut S,
    pb: &mut ProcessedBlock,
    params: &ConsensusParams,
    signatures: &dyn SignatureVerifier,
    proofs: &dyn ProofVerifier,
) -> Result<(), Error>
where
    S: ConsensusStore,
{
    let transactions = pb.block.transactions.clone();
    for (index, tx) in transactions.iter().enumerate() {
        valid_transaction(store, tx, pb.height, params, signatures, proofs)
            .map_err(|err| Error::Transaction(index, err))?;
        apply_transaction(store, pb, tx, params)?;
    }

    apply_matured_siacoin_outputs(store, pb, params)?;
    apply_file_contract_maintenance(store, pb, params)?;
    apply_miner_payouts(store, pb, params)
}

/// Promotes every delayed output maturing at this height into a spendable
/// siacoin output, recording the paired diffs.
fn apply_matured_siacoin_outputs<S>(
    store: &mut S,
    pb: &mut ProcessedBlock,
    params: &ConsensusParams,
) -> Result<(), Error>
where
    S: ConsensusStore,
{
    // the first maturing bucket was created by block one
    if pb.height <= params.maturity_delay {
        return Ok(());
    }

    for (id, output) in store.delayed_siacoin_outputs(pb.height)? {
        let scod = SiacoinOutputDiff {
            direction: DiffDirection::Apply,
            id,
            siacoin_output: output.clone(),
        };
        store.commit_siacoin_output_diff(&scod, DiffDirection::Apply)?;
        pb.siacoin_output_diffs.push(scod);

        let dscod = DelayedSiacoinOutputDiff {
            direction: DiffDirection::Revert,
            id,
            siacoin_output: output,
            maturity_height: pb.height,
        };
        store.commit_delayed_siacoin_output_diff(&dscod, DiffDirection::Apply)?;
        pb.delayed_siacoin_output_diffs.push(dscod);
    }

    Ok(())
}

/// Resolves every file contract whose proof window closes at this height
/// with the missed outcome.
fn apply_file_contract_maintenance<S>(
    store: &mut S,
    pb: &mut ProcessedBlock,
    params: &ConsensusParams,
) -> Result<(), Error>
where
    S: ConsensusStore,
{
    for id in store.expiring_file_contracts(pb.height)? {
        let contract = store
            .file_contract(&id)?
            .ok_or(storage::Error::MissingFileContract)?;

        for (index, output) in contract.missed_proof_outputs.iter().enumerate() {
            if output.value.is_zero() {
                continue;
            }
            let diff = DelayedSiacoinOutputDiff {
                direction: DiffDirection::Apply,
                id: id.missed_proof_output_id(index as u64),
                siacoin_output: output.clone(),
                maturity_height: pb.height + params.maturity_delay,
            };
            store.commit_delayed_siacoin_output_diff(&diff, DiffDirection::Apply)?;
            pb.delayed_siacoin_output_diffs.push(diff);
        }

        let diff = FileContractDiff {
            direction: DiffDirection::Revert,
            id,
            file_contract: contract,
        };
        store.commit_file_contract_diff(&diff, DiffDirection::Apply)?;
        pb.file_contract_diffs.push(diff);
    }

    Ok(())
}

/// Checks the miner payouts against the subsidy plus fees and enqueues
/// them as delayed outputs.
fn apply_miner_payouts<S>(
    store: &mut S,
    pb: &mut ProcessedBlock,
    params: &ConsensusParams,
) -> Result<(), Error>
where
    S: ConsensusStore,
{
    let mut expected = params.block_subsidy(pb.height);
    for tx in &pb.block.transactions {
        for fee in &tx.miner_fees {
            expected = expected
                .checked_add(fee)
                .ok_or(Error::InvalidMinerPayouts)?;
        }
    }

    let payouts = pb.block.miner_payouts.clone();
    let mut total = Currency::zero();
    for payout in &payouts {
        if payout.value.is_zero() {
            return Err(Error::InvalidMinerPayouts);
        }
        total = total
            .checked_add(&payout.value)
            .ok_or(Error::InvalidMinerPayouts)?;
    }
    if total != expected {
        return Err(Error::InvalidMinerPayouts);
    }

    for (index, payout) in payouts.iter().enumerate() {
        let diff = DelayedSiacoinOutputDiff {
            direction: DiffDirection::Apply,
            id: pb.block.miner_payout_id(index as u64),
            siacoin_output: payout.clone(),
            maturity_height: pb.height + params.maturity_delay,
        };
        store.commit_delayed_siacoin_output_diff(&diff, DiffDirection::Apply)?;
        pb.delayed_siacoin_output_diffs.push(diff);
    }

    Ok(())
}

/// Reverts everything a failed first-time application recorded, in
/// reverse authoring order, then removes the bucket and path entry it
/// created. Leaves the processed block without diffs.
fn unwind_partial_block<S>(
    store: &mut S,
    pb: &mut ProcessedBlock,
    params: &ConsensusParams,
) -> Result<(), Error>
where
    S: ConsensusStore,
{
    for diff in pb.siacoin_output_diffs.iter().rev() {
        store.commit_siacoin_output_diff(diff, DiffDirection::Revert)?;
    }
    for diff in pb.file_contract_diffs.iter().rev() {
        store.commit_file_contract_diff(diff, DiffDirection::Revert)?;
    }
    for diff in pb.siafund_output_diffs.iter().rev() {
        store.commit_siafund_output_diff(diff, DiffDirection::Revert)?;
    }
    for diff in pb.delayed_siacoin_output_diffs.iter().rev() {
        store.commit_delayed_siacoin_output_diff(diff, DiffDirection::Revert)?;
    }
    for diff in pb.siafund_pool_diffs.iter().rev() {
        store.commit_siafund_pool_diff(diff, DiffDirection::Revert)?;
    }

    pb.siacoin_output_diffs.clear();
    pb.file_contract_diffs.clear();
    pb.siafund_output_diffs.clear();
    pb.delayed_siacoin_output_diffs.clear();
    pb.siafund_pool_diffs.clear();

    store.delete_delayed_bucket(pb.height + params.maturity_delay)?;
    store.pop_path()?;
    Ok(())
}
