pub mod test_third_participant_rejected;
