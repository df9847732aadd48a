use crate::error::Error;
use chain::{SiacoinOutput, SiafundOutput, Transaction};
use network::ConsensusParams;
use storage::{
    ConsensusStore, DelayedSiacoinOutputDiff, DiffDirection, FileContractDiff, ProcessedBlock,
    SiacoinOutputDiff, SiafundOutputDiff, SiafundPoolDiff,
};

/// Applies a validated transaction to the ledger, appending every emitted
/// diff to the processed block in the exact order its effect lands.
///
/// Removals are authored with the revert direction so that the symmetric
/// commit rule removes them on apply and restores them on revert.
pub fn apply_transaction<S>(
    store: &mut S,
    pb: &mut ProcessedBlock,
    tx: &Transaction,
    params: &ConsensusParams,
) -> Result<(), Error>
where
    S: ConsensusStore,
{
    let height = pb.height;
    let maturity_height = height + params.maturity_delay;

    for input in &tx.siacoin_inputs {
        let output = store
            .siacoin_output(&input.parent_id)?
            .ok_or(storage::Error::MissingSiacoinOutput)?;
        let diff = SiacoinOutputDiff {
            direction: DiffDirection::Revert,
            id: input.parent_id,
            siacoin_output: output,
        };
        store.commit_siacoin_output_diff(&diff, DiffDirection::Apply)?;
        pb.siacoin_output_diffs.push(diff);
    }

    for (index, output) in tx.siacoin_outputs.iter().enumerate() {
        let diff = SiacoinOutputDiff {
            direction: DiffDirection::Apply,
            id: tx.siacoin_output_id(index as u64),
            siacoin_output: output.clone(),
        };
        store.commit_siacoin_output_diff(&diff, DiffDirection::Apply)?;
        pb.siacoin_output_diffs.push(diff);
    }

    for (index, contract) in tx.file_contracts.iter().enumerate() {
        let diff = FileContractDiff {
            direction: DiffDirection::Apply,
            id: tx.file_contract_id(index as u64),
            file_contract: contract.clone(),
        };
        store.commit_file_contract_diff(&diff, DiffDirection::Apply)?;
        pb.file_contract_diffs.push(diff);

        let tax = params.tax(height, &contract.payout);
        if !tax.is_zero() {
            let previous = store.siafund_pool()?;
            let adjusted = previous
                .checked_add(&tax)
                .expect("the pool plus a validated tax is far below the currency ceiling; qed");
            let diff = SiafundPoolDiff {
                direction: DiffDirection::Apply,
                previous,
                adjusted,
            };
            store.commit_siafund_pool_diff(&diff, DiffDirection::Apply)?;
            pb.siafund_pool_diffs.push(diff);
        }
    }

    for proof in &tx.storage_proofs {
        let contract = store
            .file_contract(&proof.parent_id)?
            .ok_or(storage::Error::MissingFileContract)?;
        for (index, output) in contract.valid_proof_outputs.iter().enumerate() {
            if output.value.is_zero() {
                continue;
            }
            let diff = DelayedSiacoinOutputDiff {
                direction: DiffDirection::Apply,
                id: proof.parent_id.valid_proof_output_id(index as u64),
                siacoin_output: output.clone(),
                maturity_height,
            };
            store.commit_delayed_siacoin_output_diff(&diff, DiffDirection::Apply)?;
            pb.delayed_siacoin_output_diffs.push(diff);
        }
        let diff = FileContractDiff {
            direction: DiffDirection::Revert,
            id: proof.parent_id,
            file_contract: contract,
        };
        store.commit_file_contract_diff(&diff, DiffDirection::Apply)?;
        pb.file_contract_diffs.push(diff);
    }

    for input in &tx.siafund_inputs {
        let output = store
            .siafund_output(&input.parent_id)?
            .ok_or(storage::Error::MissingSiafundOutput)?;

        let claim = claim_portion(store, &output, params)?;
        if !claim.is_zero() {
            let diff = DelayedSiacoinOutputDiff {
                direction: DiffDirection::Apply,
                id: input.parent_id.claim_output_id(),
                siacoin_output: SiacoinOutput {
                    value: claim,
                    unlock_hash: input.claim_unlock_hash,
                },
                maturity_height,
            };
            store.commit_delayed_siacoin_output_diff(&diff, DiffDirection::Apply)?;
            pb.delayed_siacoin_output_diffs.push(diff);
        }

        let diff = SiafundOutputDiff {
            direction: DiffDirection::Revert,
            id: input.parent_id,
            siafund_output: output,
        };
        store.commit_siafund_output_diff(&diff, DiffDirection::Apply)?;
        pb.siafund_output_diffs.push(diff);
    }

    for (index, output) in tx.siafund_outputs.iter().enumerate() {
        // the claim start is ledger state, whatever the transaction claims
        let mut output = output.clone();
        output.claim_start = store.siafund_pool()?;
        let diff = SiafundOutputDiff {
            direction: DiffDirection::Apply,
            id: tx.siafund_output_id(index as u64),
            siafund_output: output,
        };
        store.commit_siafund_output_diff(&diff, DiffDirection::Apply)?;
        pb.siafund_output_diffs.push(diff);
    }

    Ok(())
}

/// Siacoins accrued by a siafund output: its share of the pool growth
/// since the output was created.
fn claim_portion<S>(
    store: &S,
    output: &SiafundOutput,
    params: &ConsensusParams,
) -> Result<chain::Currency, Error>
where
    S: storage::ConsensusView,
{
    let pool = store.siafund_pool()?;
    let accrued = pool
        .checked_sub(&output.claim_start)
        .expect("the pool never shrinks below a recorded claim start; qed");
    Ok(accrued * output.value / params.siafund_count)
}
