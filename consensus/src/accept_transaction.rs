use crate::error::TransactionError;
use crate::traits::{ProofVerifier, SignatureVerifier};
use chain::{Currency, Height, Transaction};
use network::ConsensusParams;
use std::collections::HashSet;
use storage::ConsensusView;

/// Checks a transaction against the ledger as it stands right now.
///
/// "Right now" includes the effects of earlier transactions in the same
/// block, so the caller must apply each transaction before validating the
/// next one.
pub fn valid_transaction<S>(
    store: &S,
    tx: &Transaction,
    height: Height,
    params: &ConsensusParams,
    signatures: &dyn SignatureVerifier,
    proofs: &dyn ProofVerifier,
) -> Result<(), TransactionError>
where
    S: ConsensusView,
{
    if !signatures.valid_signatures(tx) {
        return Err(TransactionError::InvalidSignatures);
    }

    valid_siacoin_flow(store, tx)?;
    // contract payout splits scale the payout, so they are only checked
    // once the payout itself is known to be backed by real inputs
    valid_file_contracts(tx, height, params)?;
    valid_storage_proofs(store, tx, height, proofs)?;
    valid_siafund_flow(store, tx)?;

    Ok(())
}

fn valid_siacoin_flow<S>(store: &S, tx: &Transaction) -> Result<(), TransactionError>
where
    S: ConsensusView,
{
    let mut total_in = Currency::zero();
    let mut spent = HashSet::new();
    for input in &tx.siacoin_inputs {
        if !spent.insert(input.parent_id) {
            return Err(TransactionError::DoubleSpend);
        }
        let output = store
            .siacoin_output(&input.parent_id)?
            .ok_or(TransactionError::MissingSiacoinOutput)?;
        if output.unlock_hash != input.unlock_hash {
            return Err(TransactionError::WrongUnlockConditions);
        }
        total_in = total_in
            .checked_add(&output.value)
            .ok_or(TransactionError::CurrencyOverflow)?;
    }

    let mut total_out = Currency::zero();
    for output in &tx.siacoin_outputs {
        if output.value.is_zero() {
            return Err(TransactionError::ZeroValueOutput);
        }
        total_out = total_out
            .checked_add(&output.value)
            .ok_or(TransactionError::CurrencyOverflow)?;
    }
    for contract in &tx.file_contracts {
        if contract.payout.is_zero() {
            return Err(TransactionError::ContractPayoutInvalid);
        }
        total_out = total_out
            .checked_add(&contract.payout)
            .ok_or(TransactionError::CurrencyOverflow)?;
    }
    for fee in &tx.miner_fees {
        if fee.is_zero() {
            return Err(TransactionError::ZeroValueOutput);
        }
        total_out = total_out
            .checked_add(fee)
            .ok_or(TransactionError::CurrencyOverflow)?;
    }

    if total_in != total_out {
        return Err(TransactionError::SiacoinImbalance);
    }
    Ok(())
}

fn valid_file_contracts(
    tx: &Transaction,
    height: Height,
    params: &ConsensusParams,
) -> Result<(), TransactionError> {
    for contract in &tx.file_contracts {
        if contract.start_height <= height || contract.end_height <= contract.start_height {
            return Err(TransactionError::ContractWindowInvalid);
        }

        let tax = params.tax(height, &contract.payout);
        let outcome_sum = contract
            .payout
            .checked_sub(&tax)
            .ok_or(TransactionError::ContractPayoutInvalid)?;
        if output_sum(&contract.valid_proof_outputs)? != outcome_sum
            || output_sum(&contract.missed_proof_outputs)? != outcome_sum
        {
            return Err(TransactionError::ContractPayoutInvalid);
        }
    }
    Ok(())
}

fn valid_storage_proofs<S>(
    store: &S,
    tx: &Transaction,
    height: Height,
    proofs: &dyn ProofVerifier,
) -> Result<(), TransactionError>
where
    S: ConsensusView,
{
    let mut proven = HashSet::new();
    for proof in &tx.storage_proofs {
        if !proven.insert(proof.parent_id) {
            return Err(TransactionError::DoubleSpend);
        }
        let contract = store
            .file_contract(&proof.parent_id)?
            .ok_or(TransactionError::MissingFileContract)?;
        if height < contract.start_height {
            return Err(TransactionError::EarlyStorageProof);
        }
        if !proofs.valid_proof(&contract, proof) {
            return Err(TransactionError::InvalidStorageProof);
        }
    }
    Ok(())
}

fn valid_siafund_flow<S>(store: &S, tx: &Transaction) -> Result<(), TransactionError>
where
    S: ConsensusView,
{
    let mut total_in = Currency::zero();
    let mut spent = HashSet::new();
    for input in &tx.siafund_inputs {
        if !spent.insert(input.parent_id) {
            return Err(TransactionError::DoubleSpend);
        }
        let output = store
            .siafund_output(&input.parent_id)?
            .ok_or(TransactionError::MissingSiafundOutput)?;
        if output.unlock_hash != input.unlock_hash {
            return Err(TransactionError::WrongUnlockConditions);
        }
        total_in = total_in
            .checked_add(&output.value)
            .ok_or(TransactionError::CurrencyOverflow)?;
    }

    let mut total_out = Currency::zero();
    for output in &tx.siafund_outputs {
        if output.value.is_zero() {
            return Err(TransactionError::ZeroValueOutput);
        }
        total_out = total_out
            .checked_add(&output.value)
            .ok_or(TransactionError::CurrencyOverflow)?;
    }

    if total_in != total_out {
        return Err(TransactionError::SiafundImbalance);
    }
    Ok(())
}

fn output_sum(outputs: &[chain::SiacoinOutput]) -> Result<Currency, TransactionError> {
    let mut sum = Currency::zero();
    for output in outputs {
        sum = sum
            .checked_add(&output.value)
            .ok_or(TransactionError::CurrencyOverflow)?;
    }
    Ok(sum)
}
