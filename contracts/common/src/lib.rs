#![no_std]

#[cfg(test)]
extern crate std;

pub mod access;
pub mod accrual;
pub mod checkpoint;
pub mod guard;
pub mod pausable;
pub mod vault;
