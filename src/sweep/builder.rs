//! Sweep transaction construction.
//!
//! Everything in here is pure: the executor gathers chain state, then hands a
//! [`SweepPlan`] to these functions to get instructions and a signed transaction.

use crate::chain::{SweepError, SweepResult};
use solana_sdk::compute_budget::ComputeBudgetInstruction;
use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::packet::PACKET_DATA_SIZE;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use solana_sdk::transaction::Transaction;
use spl_associated_token_account::get_associated_token_address;
use spl_associated_token_account::instruction::create_associated_token_account_idempotent;

/// Associated token account of `wallet` for `mint`
pub fn derive_token_account(wallet: &Pubkey, mint: &Pubkey) -> Pubkey {
    get_associated_token_address(wallet, mint)
}

/// Inputs for one sweep transaction, resolved against live chain state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepPlan {
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub fee_payer: Pubkey,
    pub source: Pubkey,
    pub destination_wallet: Pubkey,
    pub destination: Pubkey,
    /// Balance read right before building; the whole of it moves
    pub amount: u64,
    pub create_destination: bool,
    pub priority_fee_micro_lamports: u64,
}

/// Priority fee first, then the optional account creation, then the transfer
pub fn build_sweep_instructions(plan: &SweepPlan) -> SweepResult<Vec<Instruction>> {
    let mut instructions = Vec::with_capacity(3);

    instructions.push(ComputeBudgetInstruction::set_compute_unit_price(
        plan.priority_fee_micro_lamports,
    ));

    if plan.create_destination {
        instructions.push(create_associated_token_account_idempotent(
            &plan.fee_payer,
            &plan.destination_wallet,
            &plan.mint,
            &spl_token::id(),
        ));
    }

    instructions.push(spl_token::instruction::transfer(
        &spl_token::id(),
        &plan.source,
        &plan.destination,
        &plan.owner,
        &[],
        plan.amount,
    )?);

    Ok(instructions)
}

/// Sign with the fee payer and the owner, rejecting anything over one packet
pub fn sign_transaction(
    instructions: &[Instruction],
    fee_payer: &Keypair,
    owner: &Keypair,
    blockhash: Hash,
) -> SweepResult<Transaction> {
    let mut signers = vec![fee_payer];
    if owner.pubkey() != fee_payer.pubkey() {
        signers.push(owner);
    }

    let transaction = Transaction::new_signed_with_payer(
        instructions,
        Some(&fee_payer.pubkey()),
        &signers,
        blockhash,
    );

    let size = bincode::serialized_size(&transaction)?;
    if size > PACKET_DATA_SIZE as u64 {
        return Err(SweepError::TransactionTooLarge {
            size,
            limit: PACKET_DATA_SIZE as u64,
        });
    }

    Ok(transaction)
}
