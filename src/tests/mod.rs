//! Scenario tests driving a host kernel through the simulator in
//! [`helpers`].

mod helpers;

mod lifecycle;
mod platform;
mod scheduling;
