pub mod epoch_intermediates;
